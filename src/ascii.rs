//! ASCII rendering of meta tiles
//!
//! One glyph per cell, chosen by the most visible property present.

use crate::coords::Coord;
use crate::meta::{MetaGrid, MetaTile, PROPERTY_COUNT};

/// Get ASCII character for a meta tile
pub fn meta_char(tile: MetaTile) -> char {
    use crate::meta::MetaProperty::*;

    if tile.has(Water) {
        return '~';
    }
    if tile.has(Rocks) {
        return match (tile.has(OreDeposit), tile.has(Harvested)) {
            (_, true) => 'v',
            (true, false) => '$',
            (false, false) => '^',
        };
    }
    if tile.has(Drywall) {
        return '|';
    }
    if tile.has(Bricks) {
        return '#';
    }
    if tile.has(Beam) {
        return '+';
    }
    if tile.has(Tree) {
        return if tile.has(Harvested) {
            't'
        } else if tile.has(PlantMature) {
            'Y'
        } else {
            'T'
        };
    }
    if tile.has(Bush) {
        return if tile.has(Harvested) {
            'h'
        } else if tile.has(PlantMature) {
            'B'
        } else {
            'b'
        };
    }
    if tile.has(Flowers) {
        return '*';
    }
    if tile.has(Grass) {
        return '"';
    }
    if tile.has(Sand) {
        return ':';
    }
    if tile.has(Floor) {
        return '=';
    }
    '.'
}

/// Render a block of the world to an ASCII string, sampling as needed
pub fn render_meta_ascii(grid: &mut MetaGrid, origin: Coord, width: usize, height: usize) -> String {
    let mut result = String::with_capacity((width + 1) * height);

    for dy in 0..height as i64 {
        for dx in 0..width as i64 {
            result.push(meta_char(grid.sample(origin.offset(dx, dy))));
        }
        result.push('\n');
    }

    result
}

/// Count cells per property over a block
pub fn property_counts(
    grid: &mut MetaGrid,
    origin: Coord,
    width: usize,
    height: usize,
) -> [usize; PROPERTY_COUNT] {
    let mut counts = [0; PROPERTY_COUNT];
    for dy in 0..height as i64 {
        for dx in 0..width as i64 {
            for property in grid.sample(origin.offset(dx, dy)).properties() {
                counts[property.index()] += 1;
            }
        }
    }
    counts
}

/// Generate legend for meta glyphs
pub fn meta_legend() -> String {
    "=== META LEGEND ===\n\
     ~ water   ^ rocks   $ ore     v mined\n\
     | drywall # bricks  + beam\n\
     T tree    Y mature  t felled\n\
     b bush    B mature  h picked\n\
     * flowers \" grass   : sand    = floor   . bare\n"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::MetaProperty::*;

    #[test]
    fn test_meta_char_priority() {
        assert_eq!(meta_char(MetaTile::EMPTY), '.');
        assert_eq!(meta_char(MetaTile::from_properties(&[Grass])), '"');
        assert_eq!(meta_char(MetaTile::from_properties(&[Grass, Tree])), 'T');
        assert_eq!(
            meta_char(MetaTile::from_properties(&[Grass, Tree, PlantMature])),
            'Y'
        );
        assert_eq!(meta_char(MetaTile::from_properties(&[Rocks, OreDeposit])), '$');
        assert_eq!(meta_char(MetaTile::from_properties(&[Beam, Drywall])), '|');
        assert_eq!(meta_char(MetaTile::from_properties(&[Grass, Bush])), 'b');
        assert_eq!(
            meta_char(MetaTile::from_properties(&[Grass, Bush, Harvested])),
            'h'
        );
        assert!(meta_legend().contains("h picked"));
    }

    #[test]
    fn test_render_meta_ascii_shape() {
        let mut grid = MetaGrid::blank();
        grid.write(Coord::new(11, 5), MetaTile::from_properties(&[Water]));
        let text = render_meta_ascii(&mut grid, Coord::new(10, 5), 3, 2);
        assert_eq!(text, ".~.\n...\n");
    }

    #[test]
    fn test_property_counts() {
        let mut grid = MetaGrid::blank();
        grid.write(Coord::new(0, 0), MetaTile::from_properties(&[Grass, Bush]));
        grid.write(Coord::new(1, 0), MetaTile::from_properties(&[Grass]));
        let counts = property_counts(&mut grid, Coord::new(0, 0), 4, 4);
        assert_eq!(counts[Grass.index()], 2);
        assert_eq!(counts[Bush.index()], 1);
        assert_eq!(counts[Water.index()], 0);
    }
}
