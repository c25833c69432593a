use std::path::PathBuf;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tileworld::ascii::{meta_legend, render_meta_ascii};
use tileworld::meta::MetaProperty;
use tileworld::raster::{compose_view, AtlasImage};
use tileworld::seeds::WorldSeeds;
use tileworld::{Coord, EngineConfig, TileEngine};

#[derive(Parser, Debug)]
#[command(name = "tileworld")]
#[command(about = "Generate, edit and scroll a procedural tile world")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Engine config as JSON (defaults are used for missing fields)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Viewport width in cells
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// Viewport height in cells
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Number of scroll ticks to run
    #[arg(long, default_value = "32")]
    steps: usize,

    /// Cells scrolled per tick along x
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    step_x: i64,

    /// Cells scrolled per tick along y
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    step_y: i64,

    /// Random property flips per tick inside the viewport
    #[arg(long, default_value = "4")]
    edits: usize,

    /// Export the atlas to PNG
    #[arg(long)]
    atlas_png: Option<PathBuf>,

    /// Export the final composed view to PNG
    #[arg(long)]
    view_png: Option<PathBuf>,

    /// Print an ASCII preview of the final view
    #[arg(long)]
    ascii: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    } else if args.config.is_none() {
        config.seed = WorldSeeds::default().master;
    }
    if let Some(width) = args.width {
        config.view_width = width;
    }
    if let Some(height) = args.height {
        config.view_height = height;
    }

    println!("Building tile world with seed: {}", config.seed);
    println!(
        "Viewport: {}x{} cells, atlas: {}px tiles in {}px",
        config.view_width, config.view_height, config.tile_px, config.atlas_px
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut engine = TileEngine::new(config)?;
    let mut atlas_image = AtlasImage::new(engine.layout());

    engine.tick();
    engine.flush_pending(&mut atlas_image);
    println!("Initial view: {}", engine.stats().summary());

    for step in 1..=args.steps {
        let (x, y) = engine.viewport().offset();
        let (width, height) = engine.viewport().size();

        for _ in 0..args.edits {
            let coord = Coord::new(
                x + rng.gen_range(0..width as i64),
                y + rng.gen_range(0..height as i64),
            );
            let property = MetaProperty::ALL[rng.gen_range(0..MetaProperty::ALL.len())];
            engine.flip_meta(coord, property);
        }

        engine.set_offset(x + args.step_x, y + args.step_y);
        engine.tick();
        engine.flush_pending(&mut atlas_image);

        if step % 8 == 0 || step == args.steps {
            println!("Step {}: {}", step, engine.stats().summary());
        }
    }

    if let Some(err) = engine.last_atlas_error() {
        println!("Warning: {}", err);
    }

    if let Some(path) = &args.atlas_png {
        atlas_image.save(path)?;
        println!("Atlas exported to {}", path.display());
    }

    if let Some(path) = &args.view_png {
        let view = compose_view(engine.viewport(), engine.buffer(), &atlas_image);
        view.save(path)?;
        println!("View exported to {}", path.display());
    }

    if args.ascii {
        let (x, y) = engine.viewport().offset();
        let (width, height) = engine.viewport().size();
        let text = render_meta_ascii(engine.grid_mut(), Coord::new(x, y), width, height);
        println!("{}", text);
        println!("{}", meta_legend());
    }

    Ok(())
}
