//! Atlas rasterization.
//!
//! [`Rasterizer`] is the seam to a drawing backend: it receives each newly
//! assigned slot once, in slot order. [`AtlasImage`] is a debug backend that
//! paints flat colour swatches, one per set feature part, so atlas contents
//! and composed views can be inspected as PNGs.

use std::path::Path;

use image::{Rgb, RgbImage};

use crate::atlas::{AtlasLayout, AtlasSlot};
use crate::viewport::{SlotBuffer, ViewportWindow};
use crate::visual::{Feature, Part, VisualFlag, VisualTile};

/// Drawing backend for atlas slots.
pub trait Rasterizer {
    /// Draw `tile` into the atlas cell `(row, col)` reserved for `slot`.
    fn rasterize(&mut self, slot: AtlasSlot, cell: (u32, u32), tile: &VisualTile);
}

/// Unpainted pixel; top-layer tiles are see-through wherever it remains.
pub const BACKGROUND: Rgb<u8> = Rgb([0, 0, 0]);

const GROUND: Rgb<u8> = Rgb([92, 74, 52]);

fn feature_color(feature: Feature) -> Rgb<u8> {
    match feature {
        Feature::Grass => Rgb([86, 152, 60]),
        Feature::Bush => Rgb([52, 118, 48]),
        Feature::BushMature => Rgb([40, 128, 70]),
        Feature::BushHarvested => Rgb([110, 120, 70]),
        Feature::Tree => Rgb([28, 90, 36]),
        Feature::TreeMature => Rgb([20, 104, 52]),
        Feature::TreeHarvested => Rgb([120, 96, 60]),
        Feature::Flowers => Rgb([210, 120, 180]),
        Feature::FlowersMature => Rgb([236, 200, 80]),
        Feature::Rocks => Rgb([128, 128, 132]),
        Feature::RocksOre => Rgb([180, 120, 70]),
        Feature::RocksMined => Rgb([90, 90, 96]),
        Feature::Bricks => Rgb([170, 70, 56]),
        Feature::Beam => Rgb([140, 100, 60]),
        Feature::Drywall => Rgb([220, 216, 206]),
        Feature::Floor => Rgb([160, 136, 100]),
        Feature::Sand => Rgb([226, 206, 140]),
        Feature::Water => Rgb([52, 96, 188]),
    }
}

/// Features that stand above the ground and draw on the top layer.
fn is_tall(feature: Feature) -> bool {
    matches!(
        feature,
        Feature::Bush
            | Feature::BushMature
            | Feature::BushHarvested
            | Feature::Tree
            | Feature::TreeMature
            | Feature::TreeHarvested
            | Feature::Beam
            | Feature::Drywall
    )
}

/// Column and row of a part within a 3x3 split of the tile.
fn part_cell(part: Part) -> (u32, u32) {
    match part {
        Part::Center => (1, 1),
        Part::North => (1, 0),
        Part::East => (2, 1),
        Part::South => (1, 2),
        Part::West => (0, 1),
        Part::NorthEast => (2, 0),
        Part::NorthWest => (0, 0),
        Part::SouthEast => (2, 2),
        Part::SouthWest => (0, 2),
    }
}

/// Pixel colours of one tile, row-major, `tile_px * tile_px` long.
pub fn paint_tile(tile: &VisualTile, tile_px: u32) -> Vec<Rgb<u8>> {
    let top = tile.has(VisualFlag::LayerTop);
    let fill = if !top && tile.has(VisualFlag::Ground) {
        GROUND
    } else {
        BACKGROUND
    };
    let mut pixels = vec![fill; (tile_px * tile_px) as usize];

    for flag in tile.flags() {
        let VisualFlag::Blend(feature, part) = flag else {
            continue;
        };
        if is_tall(feature) != top {
            continue;
        }
        let (col, row) = part_cell(part);
        let x0 = tile_px * col / 3;
        let x1 = tile_px * (col + 1) / 3;
        let y0 = tile_px * row / 3;
        let y1 = tile_px * (row + 1) / 3;
        let color = feature_color(feature);
        for y in y0..y1 {
            for x in x0..x1 {
                pixels[(y * tile_px + x) as usize] = color;
            }
        }
    }

    pixels
}

/// Debug atlas surface.
pub struct AtlasImage {
    layout: AtlasLayout,
    image: RgbImage,
    drawn: usize,
    clipped: usize,
}

impl AtlasImage {
    pub fn new(layout: AtlasLayout) -> Self {
        Self {
            layout,
            image: RgbImage::from_pixel(layout.atlas_px, layout.atlas_px, BACKGROUND),
            drawn: 0,
            clipped: 0,
        }
    }

    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Slots painted so far
    pub fn drawn(&self) -> usize {
        self.drawn
    }

    /// Slots that fell outside the surface (atlas overflow)
    pub fn clipped(&self) -> usize {
        self.clipped
    }

    /// Whether a slot's cell lies inside the surface.
    pub fn holds(&self, slot: AtlasSlot) -> bool {
        let (row, col) = self.layout.slot_cell(slot);
        let cols = self.layout.columns();
        row < cols && col < cols
    }

    pub fn save(&self, path: &Path) -> image::ImageResult<()> {
        self.image.save(path)
    }
}

impl Rasterizer for AtlasImage {
    fn rasterize(&mut self, slot: AtlasSlot, cell: (u32, u32), tile: &VisualTile) {
        let (row, col) = cell;
        let cols = self.layout.columns();
        if row >= cols || col >= cols {
            self.clipped += 1;
            return;
        }

        let tile_px = self.layout.tile_px;
        let (ox, oy) = self.layout.slot_origin_px(slot);
        let pixels = paint_tile(tile, tile_px);
        for y in 0..tile_px {
            for x in 0..tile_px {
                self.image
                    .put_pixel(ox + x, oy + y, pixels[(y * tile_px + x) as usize]);
            }
        }
        self.drawn += 1;
    }
}

/// Compose the visible window from atlas pixels: bottom sprite first, then
/// the top sprite wherever it is not background.
pub fn compose_view(viewport: &ViewportWindow, buffer: &SlotBuffer, atlas: &AtlasImage) -> RgbImage {
    let layout = atlas.layout();
    let tile_px = layout.tile_px;
    let (width, height) = viewport.size();
    let mut img = RgbImage::from_pixel(width as u32 * tile_px, height as u32 * tile_px, BACKGROUND);

    for row in 0..height {
        for col in 0..width {
            let Some(slots) = viewport.visible_cell(buffer, col, row) else {
                continue;
            };
            let dest_x = col as u32 * tile_px;
            let dest_y = row as u32 * tile_px;

            for (slot, overlay) in [(slots.bottom, false), (slots.top, true)] {
                let Some(slot) = slot.filter(|s| atlas.holds(*s)) else {
                    continue;
                };
                let (sx, sy) = layout.slot_origin_px(slot);
                for ty in 0..tile_px {
                    for tx in 0..tile_px {
                        let pixel = *atlas.image().get_pixel(sx + tx, sy + ty);
                        if overlay && pixel == BACKGROUND {
                            continue;
                        }
                        img.put_pixel(dest_x + tx, dest_y + ty, pixel);
                    }
                }
            }
        }
    }

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::CellSlots;

    fn tile_with(names: &[&str]) -> VisualTile {
        let mut tile = VisualTile::EMPTY;
        for name in names {
            tile.set(VisualFlag::by_name(name));
        }
        tile
    }

    #[test]
    fn test_paint_tile_splits_parts() {
        let tile = tile_with(&["ground", "water-center", "water-north-west"]);
        let pixels = paint_tile(&tile, 9);
        let water = feature_color(Feature::Water);
        assert_eq!(pixels[4 * 9 + 4], water);
        assert_eq!(pixels[0], water);
        assert_eq!(pixels[8], GROUND);
        assert_eq!(pixels.iter().filter(|p| **p == water).count(), 18);
    }

    #[test]
    fn test_top_layer_only_draws_tall_features() {
        let tile = tile_with(&["ground", "layer-top", "grass-center", "tree-center"]);
        let pixels = paint_tile(&tile, 3);
        assert_eq!(pixels[4], feature_color(Feature::Tree));
        assert!(pixels
            .iter()
            .enumerate()
            .all(|(i, p)| i == 4 || *p == BACKGROUND));

        let bottom = tile_with(&["ground", "grass-center", "tree-center"]);
        assert_eq!(paint_tile(&bottom, 3)[4], feature_color(Feature::Grass));
    }

    #[test]
    fn test_atlas_image_clips_overflow() {
        let layout = AtlasLayout::new(4, 8);
        let mut atlas = AtlasImage::new(layout);
        let tile = tile_with(&["ground"]);

        atlas.rasterize(3, layout.slot_cell(3), &tile);
        assert_eq!(*atlas.image().get_pixel(4, 4), GROUND);
        assert_eq!(*atlas.image().get_pixel(0, 0), BACKGROUND);

        atlas.rasterize(4, layout.slot_cell(4), &tile);
        assert_eq!(atlas.drawn(), 1);
        assert_eq!(atlas.clipped(), 1);
        assert!(!atlas.holds(4));
    }

    #[test]
    fn test_compose_view_overlays_top() {
        let layout = AtlasLayout::new(3, 6);
        let mut atlas = AtlasImage::new(layout);
        atlas.rasterize(0, layout.slot_cell(0), &tile_with(&["ground", "sand-center"]));
        atlas.rasterize(
            1,
            layout.slot_cell(1),
            &tile_with(&["ground", "layer-top", "tree-south"]),
        );

        let viewport = ViewportWindow::new(1, 1, (0, 0));
        let mut buffer = viewport.new_buffer();
        *buffer.get_mut(0, 0) = CellSlots {
            bottom: Some(0),
            top: Some(1),
        };

        let img = compose_view(&viewport, &buffer, &atlas);
        assert_eq!(img.dimensions(), (3, 3));
        assert_eq!(*img.get_pixel(1, 1), feature_color(Feature::Sand));
        assert_eq!(*img.get_pixel(1, 2), feature_color(Feature::Tree));
        assert_eq!(*img.get_pixel(0, 0), GROUND);
    }
}
