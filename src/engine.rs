//! Tile engine: the meta grid, atlas and viewport wired together.
//!
//! A tick runs `update_meta` (written cells become visual dirt), then
//! `update_vis` (dirty cells are resolved and assigned atlas slots). Slots
//! first seen during the tick wait in the atlas until `flush_pending` hands
//! them to a rasterizer.

use crate::atlas::{AtlasAllocator, AtlasError, AtlasLayout, AtlasSlot, AtlasStats};
use crate::config::{ConfigError, EngineConfig};
use crate::coords::Coord;
use crate::meta::{GridStats, MetaGrid, MetaProperty, MetaTile, Validator};
use crate::raster::Rasterizer;
use crate::viewport::{SlotBuffer, ViewportStats, ViewportWindow};
use crate::visual::{resolve, VisualScratch, VisualTile};

/// Atlas slots of one cell's two visual layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SlotPair {
    pub bottom: AtlasSlot,
    pub top: AtlasSlot,
}

/// Combined statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineStats {
    pub grid: GridStats,
    pub atlas: AtlasStats,
    pub viewport: ViewportStats,
    /// Cells held by the meta cache
    pub cached_cells: usize,
    /// Slots waiting for the rasterizer
    pub pending: usize,
    pub ticks: usize,
}

impl EngineStats {
    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Ticks: {} | Cells: {} (derived {}, written {}) | {} | Pending: {} | Resolved: {}",
            self.ticks,
            self.cached_cells,
            self.grid.derived,
            self.grid.writes,
            self.atlas.summary(),
            self.pending,
            self.viewport.resampled
        )
    }
}

pub struct TileEngine {
    config: EngineConfig,
    grid: MetaGrid,
    atlas: AtlasAllocator,
    viewport: ViewportWindow,
    buffer: SlotBuffer,
    scratch: VisualScratch,
    ticks: usize,
}

impl TileEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = MetaGrid::new(config.build_layers(), Validator::default());
        let atlas = AtlasAllocator::new(config.layout());
        let viewport = ViewportWindow::new(
            config.view_width,
            config.view_height,
            (config.start_x, config.start_y),
        );
        let buffer = viewport.new_buffer();

        log::debug!(
            "engine: seed {}, {} layers, atlas {} slots, view {}x{}",
            config.seed,
            config.layers.len(),
            atlas.capacity(),
            config.view_width,
            config.view_height
        );

        Ok(Self {
            config,
            grid,
            atlas,
            viewport,
            buffer,
            scratch: VisualScratch::new(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn layout(&self) -> AtlasLayout {
        self.atlas.layout()
    }

    pub fn grid(&self) -> &MetaGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut MetaGrid {
        &mut self.grid
    }

    pub fn atlas(&self) -> &AtlasAllocator {
        &self.atlas
    }

    pub fn viewport(&self) -> &ViewportWindow {
        &self.viewport
    }

    pub fn buffer(&self) -> &SlotBuffer {
        &self.buffer
    }

    /// Validated meta tile at a world cell.
    pub fn sample_meta(&mut self, coord: Coord) -> MetaTile {
        self.grid.sample(coord)
    }

    /// Overwrite a cell. The value is validated; the stored value is
    /// returned. Visuals catch up on the next tick.
    pub fn write_meta(&mut self, coord: Coord, tile: MetaTile) -> MetaTile {
        self.grid.write(coord, tile)
    }

    pub fn flip_meta(&mut self, coord: Coord, property: MetaProperty) -> MetaTile {
        self.grid.flip(coord, property)
    }

    /// Visual tiles of any world cell, tracked or not.
    pub fn visuals_at(&mut self, coord: Coord) -> (VisualTile, VisualTile) {
        let pair = resolve(&mut self.grid, coord, &mut self.scratch);
        (pair.bottom, pair.top)
    }

    /// Atlas slots for a cell's visuals, assigning new ones as needed.
    pub fn resolve_visual(&mut self, coord: Coord) -> SlotPair {
        let pair = resolve(&mut self.grid, coord, &mut self.scratch);
        SlotPair {
            bottom: self.atlas.get_slot(pair.bottom.as_bytes()),
            top: self.atlas.get_slot(pair.top.as_bytes()),
        }
    }

    pub fn set_offset(&mut self, x: i64, y: i64) -> bool {
        self.viewport.set_offset(x, y)
    }

    pub fn update_meta(&mut self) -> bool {
        self.viewport.update_meta(&mut self.grid)
    }

    pub fn update_vis(&mut self) -> bool {
        self.viewport.update_vis(
            &mut self.grid,
            &mut self.atlas,
            &mut self.buffer,
            &mut self.scratch,
        )
    }

    /// One frame: meta propagation, then visual resolution. Returns whether
    /// the buffer changed.
    pub fn tick(&mut self) -> bool {
        let meta = self.update_meta();
        let vis = self.update_vis();
        self.ticks += 1;
        if vis {
            log::debug!(
                "tick {}: {} cells resolved, {} slots pending",
                self.ticks,
                self.viewport.stats().last_resampled,
                self.atlas.pending_len()
            );
        }
        meta || vis
    }

    /// Hand every newly assigned slot to the rasterizer, oldest first.
    /// Returns the number of slots drawn.
    pub fn flush_pending<R: Rasterizer>(&mut self, rasterizer: &mut R) -> usize {
        let layout = self.atlas.layout();
        let mut flushed = 0;
        for (slot, content) in self.atlas.drain_pending() {
            match VisualTile::from_slice(content) {
                Some(tile) => {
                    rasterizer.rasterize(slot, layout.slot_cell(slot), &tile);
                    flushed += 1;
                }
                None => log::warn!("slot {} holds {} bytes, not a visual tile", slot, content.len()),
            }
        }
        flushed
    }

    /// Forget every atlas slot and re-resolve the whole viewport.
    pub fn reset_atlas(&mut self) {
        self.atlas.reset();
        self.buffer = self.viewport.new_buffer();
        self.viewport.dirty_all();
        log::info!("atlas reset, {} cells to re-resolve", self.viewport.dirty_vis().len());
    }

    pub fn last_atlas_error(&self) -> Option<&AtlasError> {
        self.atlas.last_error()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            grid: self.grid.stats(),
            atlas: self.atlas.stats(),
            viewport: self.viewport.stats(),
            cached_cells: self.grid.cached_len(),
            pending: self.atlas.pending_len(),
            ticks: self.ticks,
        }
    }
}
