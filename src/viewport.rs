//! Toroidal viewport buffer and visual dirty tracking.
//!
//! The viewport tracks a `width x (height + 1)` block of world cells anchored
//! at its offset: the visible `width x height` window plus one overlap row
//! below it. Each buffer cell holds two atlas slots that compose one drawn
//! row: the bottom-layer sprite of its own cell and the top-layer sprite of
//! the cell directly south (tall content reaches one row up). Resolving a
//! cell therefore writes its bottom slot into its own buffer cell and its top
//! slot into the buffer cell to the north.
//!
//! The buffer is toroidal: world cell `c` lives at `(c - origin) mod dims`
//! for the fixed origin the viewport was created at, so scrolling only
//! re-resolves the cells that entered the tracked block.

use std::collections::BTreeSet;

use crate::atlas::{AtlasAllocator, AtlasSlot};
use crate::coords::Coord;
use crate::meta::MetaGrid;
use crate::scroll_cache::{clamp_offset, entered_regions};
use crate::tilemap::Tilemap;
use crate::visual::{resolve, VisualScratch};

/// Slots drawn for one buffer cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CellSlots {
    /// Bottom-layer sprite of this cell
    pub bottom: Option<AtlasSlot>,
    /// Top-layer sprite of the cell to the south
    pub top: Option<AtlasSlot>,
}

/// Toroidal slot storage for a viewport.
pub type SlotBuffer = Tilemap<CellSlots>;

/// Viewport statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewportStats {
    /// Cells resolved over the viewport's lifetime
    pub resampled: usize,
    /// Cells resolved by the most recent `update_vis`
    pub last_resampled: usize,
    /// Offset changes that dirtied cells
    pub scrolls: usize,
}

/// Visible window over the world with its dirty set.
#[derive(Clone, Debug)]
pub struct ViewportWindow {
    width: usize,
    height: usize,
    offset: (i64, i64),
    origin: (i64, i64),
    dirty: BTreeSet<Coord>,
    stats: ViewportStats,
}

impl ViewportWindow {
    /// A viewport anchored at `offset`, with every tracked cell dirty.
    /// Offsets are clamped to [`MAX_OFFSET`](crate::scroll_cache::MAX_OFFSET).
    pub fn new(width: usize, height: usize, offset: (i64, i64)) -> Self {
        let offset = (clamp_offset(offset.0), clamp_offset(offset.1));
        let mut viewport = Self {
            width: width.max(1),
            height: height.max(1),
            offset,
            origin: offset,
            dirty: BTreeSet::new(),
            stats: ViewportStats::default(),
        };
        viewport.dirty_all();
        viewport
    }

    /// Buffer sized for this viewport (tracked block, overlap row included).
    pub fn new_buffer(&self) -> SlotBuffer {
        let (w, h) = self.tracked_extent();
        Tilemap::new(w as usize, h as usize)
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn offset(&self) -> (i64, i64) {
        self.offset
    }

    /// Size of the tracked block (visible window plus the overlap row).
    pub fn tracked_extent(&self) -> (i64, i64) {
        (self.width as i64, self.height as i64 + 1)
    }

    /// Whether `coord` is in the tracked block.
    pub fn contains(&self, coord: Coord) -> bool {
        let (w, h) = self.tracked_extent();
        match (
            coord.x.checked_sub(self.offset.0),
            coord.y.checked_sub(self.offset.1),
        ) {
            (Some(dx), Some(dy)) => dx >= 0 && dx < w && dy >= 0 && dy < h,
            _ => false,
        }
    }

    /// Whether `coord` is in the visible window.
    pub fn is_visible(&self, coord: Coord) -> bool {
        self.contains(coord) && coord.y - self.offset.1 < self.height as i64
    }

    /// Physical buffer cell of a world coordinate.
    pub fn buffer_index(&self, coord: Coord) -> (usize, usize) {
        let (w, h) = self.tracked_extent();
        (
            (coord.x as i128 - self.origin.0 as i128).rem_euclid(w as i128) as usize,
            (coord.y as i128 - self.origin.1 as i128).rem_euclid(h as i128) as usize,
        )
    }

    /// Slots for a tracked world cell.
    pub fn slots_at(&self, buffer: &SlotBuffer, coord: Coord) -> Option<CellSlots> {
        if !self.contains(coord) {
            return None;
        }
        let (x, y) = self.buffer_index(coord);
        Some(*buffer.get(x, y))
    }

    /// Slots for a window-relative cell (`col < width`, `row < height`).
    pub fn visible_cell(&self, buffer: &SlotBuffer, col: usize, row: usize) -> Option<CellSlots> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.slots_at(
            buffer,
            Coord::new(self.offset.0 + col as i64, self.offset.1 + row as i64),
        )
    }

    /// Cells awaiting re-resolution.
    pub fn dirty_vis(&self) -> &BTreeSet<Coord> {
        &self.dirty
    }

    pub fn stats(&self) -> ViewportStats {
        self.stats
    }

    /// Mark a cell for re-resolution if it is tracked.
    pub fn mark_dirty(&mut self, coord: Coord) -> bool {
        if self.contains(coord) {
            self.dirty.insert(coord)
        } else {
            false
        }
    }

    /// Mark every tracked cell.
    pub fn dirty_all(&mut self) {
        let (w, h) = self.tracked_extent();
        for dy in 0..h {
            for dx in 0..w {
                self.dirty
                    .insert(Coord::new(self.offset.0 + dx, self.offset.1 + dy));
            }
        }
    }

    /// Move the window. Only cells that entered the tracked block are
    /// dirtied, plus the cell south of each (its top sprite composes into
    /// the entered cell). Offsets are clamped like the scroll cache's.
    /// Returns whether the offset changed.
    pub fn set_offset(&mut self, x: i64, y: i64) -> bool {
        let old = self.offset;
        let new = (clamp_offset(x), clamp_offset(y));
        if old == new {
            return false;
        }

        let extent = self.tracked_extent();
        self.offset = new;
        let mut dirty = std::mem::take(&mut self.dirty);
        dirty.retain(|c| self.contains(*c));
        self.dirty = dirty;

        if new.0.abs_diff(old.0) >= extent.0 as u64 || new.1.abs_diff(old.1) >= extent.1 as u64 {
            log::warn!("viewport jump {:?} -> {:?}, re-dirtying all", old, new);
        }

        for rect in entered_regions(old, new, extent) {
            for (wx, wy) in rect.cells() {
                let entered = Coord::new(wx, wy);
                self.mark_dirty(entered);
                self.mark_dirty(entered.south());
            }
        }

        self.stats.scrolls += 1;
        true
    }

    /// Turn written meta cells into visual dirt: each written cell can change
    /// the visuals of its whole 3x3 block. Returns whether anything changed.
    pub fn update_meta(&mut self, grid: &mut MetaGrid) -> bool {
        let written = grid.take_dirty();
        if written.is_empty() {
            return false;
        }

        for coord in written {
            for affected in coord.block3x3() {
                self.mark_dirty(affected);
            }
        }
        true
    }

    /// Re-resolve every dirty cell into `buffer`. Returns whether anything
    /// changed.
    pub fn update_vis(
        &mut self,
        grid: &mut MetaGrid,
        atlas: &mut AtlasAllocator,
        buffer: &mut SlotBuffer,
        scratch: &mut VisualScratch,
    ) -> bool {
        if self.dirty.is_empty() {
            self.stats.last_resampled = 0;
            return false;
        }

        let dirty = std::mem::take(&mut self.dirty);
        let count = dirty.len();

        for coord in dirty {
            let pair = resolve(grid, coord, scratch);
            let bottom = atlas.get_slot(pair.bottom.as_bytes());
            let top = atlas.get_slot(pair.top.as_bytes());

            if self.contains(coord) {
                let (x, y) = self.buffer_index(coord);
                buffer.get_mut(x, y).bottom = Some(bottom);
            }
            let north = coord.north();
            if self.contains(north) {
                let (x, y) = self.buffer_index(north);
                buffer.get_mut(x, y).top = Some(top);
            }
        }

        self.stats.last_resampled = count;
        self.stats.resampled += count;
        log::debug!("viewport resolved {} cells", count);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::AtlasLayout;
    use crate::meta::{MetaProperty, MetaTile};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    struct Rig {
        grid: MetaGrid,
        atlas: AtlasAllocator,
        viewport: ViewportWindow,
        buffer: SlotBuffer,
        scratch: VisualScratch,
    }

    impl Rig {
        fn new(width: usize, height: usize, offset: (i64, i64)) -> Self {
            let viewport = ViewportWindow::new(width, height, offset);
            let buffer = viewport.new_buffer();
            Self {
                grid: MetaGrid::blank(),
                atlas: AtlasAllocator::new(AtlasLayout::new(16, 2048)),
                viewport,
                buffer,
                scratch: VisualScratch::new(),
            }
        }

        fn tick(&mut self) -> bool {
            let meta = self.viewport.update_meta(&mut self.grid);
            let vis = self.viewport.update_vis(
                &mut self.grid,
                &mut self.atlas,
                &mut self.buffer,
                &mut self.scratch,
            );
            meta || vis
        }

        /// Buffer contents of the visible window, window-relative.
        fn visible(&self) -> Vec<CellSlots> {
            let (w, h) = self.viewport.size();
            (0..h)
                .flat_map(|row| (0..w).map(move |col| (col, row)))
                .map(|(col, row)| {
                    self.viewport
                        .visible_cell(&self.buffer, col, row)
                        .unwrap_or_default()
                })
                .collect()
        }
    }

    fn paint(grid: &mut MetaGrid, rng: &mut ChaCha8Rng, count: usize, spread: i64) {
        let palette = [
            MetaTile::from_properties(&[MetaProperty::Grass]),
            MetaTile::from_properties(&[MetaProperty::Grass, MetaProperty::Tree]),
            MetaTile::from_properties(&[MetaProperty::Water]),
            MetaTile::from_properties(&[MetaProperty::Rocks, MetaProperty::OreDeposit]),
            MetaTile::EMPTY,
        ];
        for _ in 0..count {
            let c = Coord::new(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread));
            grid.write(c, palette[rng.gen_range(0..palette.len())]);
        }
    }

    #[test]
    fn test_new_viewport_is_fully_dirty() {
        let mut rig = Rig::new(6, 4, (0, 0));
        assert_eq!(rig.viewport.dirty_vis().len(), 6 * 5);
        assert!(rig.tick());
        assert!(!rig.tick());
        assert!(rig.visible().iter().all(|s| s.bottom.is_some() && s.top.is_some()));
    }

    #[test]
    fn test_write_dirties_exactly_the_block() {
        let mut rig = Rig::new(10, 8, (0, 0));
        rig.tick();

        let c = Coord::new(4, 4);
        rig.grid.write(c, MetaTile::from_properties(&[MetaProperty::Water]));
        assert!(rig.viewport.update_meta(&mut rig.grid));

        let expected: BTreeSet<Coord> = c.block3x3().collect();
        assert_eq!(rig.viewport.dirty_vis(), &expected);

        rig.viewport
            .update_vis(&mut rig.grid, &mut rig.atlas, &mut rig.buffer, &mut rig.scratch);
        assert_eq!(rig.viewport.stats().last_resampled, 9);
    }

    #[test]
    fn test_writes_outside_are_ignored() {
        let mut rig = Rig::new(5, 5, (0, 0));
        rig.tick();
        rig.grid.write(Coord::new(50, 50), MetaTile::from_properties(&[MetaProperty::Sand]));
        assert!(rig.viewport.update_meta(&mut rig.grid));
        assert!(rig.viewport.dirty_vis().is_empty());
    }

    #[test]
    fn test_scroll_dirties_only_entered_cells() {
        let mut rig = Rig::new(8, 6, (0, 0));
        rig.tick();

        assert!(rig.viewport.set_offset(2, 0));
        // 2 new columns over 7 tracked rows
        assert_eq!(rig.viewport.dirty_vis().len(), 2 * 7);
        assert!(rig.viewport.dirty_vis().iter().all(|c| c.x >= 8));
        assert!(!rig.viewport.set_offset(2, 0));

        rig.tick();
        // one row up: the new row and the row south of it
        rig.viewport.set_offset(2, -1);
        let rows: BTreeSet<i64> = rig.viewport.dirty_vis().iter().map(|c| c.y).collect();
        assert_eq!(rows, [-1, 0].into_iter().collect());
    }

    #[test]
    fn test_buffer_index_wraps_past_dimension() {
        let viewport = ViewportWindow::new(4, 3, (0, 0));
        assert_eq!(viewport.buffer_index(Coord::new(4, 4)), (0, 0));
        assert_eq!(viewport.buffer_index(Coord::new(-1, -1)), (3, 3));
        assert!(viewport.contains(Coord::new(3, 3)));
        assert!(!viewport.is_visible(Coord::new(3, 3)));
        assert!(viewport.is_visible(Coord::new(3, 2)));
    }

    #[test]
    fn test_extreme_offsets_are_clamped() {
        use crate::scroll_cache::MAX_OFFSET;

        let mut viewport = ViewportWindow::new(4, 3, (0, 0));
        viewport.dirty.clear();

        assert!(viewport.set_offset(i64::MAX, i64::MIN));
        assert_eq!(viewport.offset(), (MAX_OFFSET, -MAX_OFFSET));
        assert_eq!(viewport.dirty_vis().len(), 4 * 4);

        assert!(viewport.set_offset(i64::MIN, 0));
        assert_eq!(viewport.offset(), (-MAX_OFFSET, 0));
        assert!(viewport.dirty_vis().iter().all(|c| viewport.contains(*c)));
        assert!(!viewport.contains(Coord::new(i64::MAX, 0)));
        assert!(viewport.buffer_index(Coord::new(i64::MIN, i64::MIN)).0 < 4);
    }

    #[test]
    fn test_incremental_matches_fresh_viewport() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut rig = Rig::new(9, 7, (0, 0));
        paint(&mut rig.grid, &mut rng, 200, 40);
        rig.tick();

        for step in 0..60 {
            let (ox, oy) = rig.viewport.offset();
            let (dx, dy) = if step % 10 == 9 {
                (rng.gen_range(-30..30), rng.gen_range(-30..30))
            } else {
                (rng.gen_range(-3..=3), rng.gen_range(-3..=3))
            };
            rig.viewport.set_offset(ox + dx, oy + dy);
            paint(&mut rig.grid, &mut rng, 5, 40);
            rig.tick();

            let mut fresh = Rig::new(9, 7, rig.viewport.offset());
            fresh.grid = std::mem::replace(&mut rig.grid, MetaGrid::blank());
            fresh.atlas = std::mem::replace(
                &mut rig.atlas,
                AtlasAllocator::new(AtlasLayout::new(16, 2048)),
            );
            fresh.tick();

            assert_eq!(rig.visible(), fresh.visible(), "step {}", step);

            rig.grid = fresh.grid;
            rig.atlas = fresh.atlas;
        }
    }
}
