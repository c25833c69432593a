//! Debug script to print the redraw regions of a scroll sequence

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tileworld::scroll_cache::ScrollCacheSplitter;

#[derive(Parser, Debug)]
#[command(name = "debug_scroll")]
struct Args {
    /// Cache width in pixels
    #[arg(long, default_value = "256")]
    width: u32,

    /// Cache height in pixels
    #[arg(long, default_value = "256")]
    height: u32,

    /// Offsets to visit as x,y pairs; a random walk is used when empty
    #[arg(value_parser = parse_offset, allow_hyphen_values = true)]
    offsets: Vec<(f64, f64)>,

    /// Random walk length
    #[arg(long, default_value = "8")]
    steps: usize,

    #[arg(long, default_value = "1")]
    seed: u64,
}

fn parse_offset(s: &str) -> Result<(f64, f64), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y, got {:?}", s))?;
    let x = x.trim().parse::<f64>().map_err(|e| e.to_string())?;
    let y = y.trim().parse::<f64>().map_err(|e| e.to_string())?;
    Ok((x, y))
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let offsets = if args.offsets.is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
        let (mut x, mut y) = (0.0f64, 0.0f64);
        let mut walk = vec![(x, y)];
        for _ in 0..args.steps {
            x += rng.gen_range(-40.0..40.0);
            y += rng.gen_range(-40.0..40.0);
            walk.push((x, y));
        }
        walk
    } else {
        args.offsets
    };

    let mut cache = ScrollCacheSplitter::new(args.width, args.height);
    println!("Cache {}x{}", args.width, args.height);

    for (x, y) in offsets {
        let mut area = 0;
        println!("-> ({:.1}, {:.1})", x, y);
        let drawn = cache.render(x, y, |region| {
            area += region.area();
            println!(
                "   x={:<4} y={:<4} {:>4}x{:<4} world=({}, {})",
                region.x, region.y, region.width, region.height, region.world_x, region.world_y
            );
        });
        println!("   {} regions, {} pixels", drawn, area);
    }
}
