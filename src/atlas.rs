//! Deduplicating atlas slot allocator.
//!
//! Every distinct visual tile byte sequence gets one slot, assigned in order
//! of first sight. Lookup is by exact byte content, never by a reduced hash,
//! so two different bit patterns can never share a slot. New slots are queued
//! for the rasterizer until drained.
//!
//! The atlas is a square grid of `tile_px` cells inside an `atlas_px` image,
//! so capacity is `(atlas_px / tile_px)^2`. Running past capacity is a
//! configuration problem: it is logged and recorded, and slots keep being
//! handed out past the nominal range.

use std::collections::{HashMap, VecDeque};
use std::fmt;

/// Index of a cell in the atlas.
pub type AtlasSlot = u32;

/// Geometry of the shared atlas surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Edge of one tile in pixels
    pub tile_px: u32,
    /// Edge of the whole atlas in pixels
    pub atlas_px: u32,
}

impl AtlasLayout {
    pub fn new(tile_px: u32, atlas_px: u32) -> Self {
        Self { tile_px, atlas_px }
    }

    /// Tiles per atlas row
    pub fn columns(&self) -> u32 {
        self.atlas_px / self.tile_px.max(1)
    }

    pub fn capacity(&self) -> usize {
        let cols = self.columns() as usize;
        cols * cols
    }

    /// `(row, col)` of a slot. Slots past capacity keep counting rows.
    pub fn slot_cell(&self, slot: AtlasSlot) -> (u32, u32) {
        let cols = self.columns().max(1);
        (slot / cols, slot % cols)
    }

    /// Top-left pixel of a slot's cell.
    pub fn slot_origin_px(&self, slot: AtlasSlot) -> (u32, u32) {
        let (row, col) = self.slot_cell(slot);
        (col * self.tile_px, row * self.tile_px)
    }
}

/// Atlas errors. Reported, never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtlasError {
    /// A new slot was assigned at or past capacity
    CapacityExceeded { slot: AtlasSlot, capacity: usize },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::CapacityExceeded { slot, capacity } => write!(
                f,
                "atlas capacity exceeded: slot {} assigned with capacity {}",
                slot, capacity
            ),
        }
    }
}

impl std::error::Error for AtlasError {}

/// Allocation statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtlasStats {
    /// Lookups answered by an existing slot
    pub hits: usize,
    /// Slots assigned
    pub assigned: usize,
    /// Slots assigned at or past capacity
    pub overflowed: usize,
}

impl AtlasStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.assigned;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }

    /// Format as human-readable string
    pub fn summary(&self) -> String {
        format!(
            "Slots: {} | Hits: {} | Rate: {:.1}% | Overflowed: {}",
            self.assigned,
            self.hits,
            self.hit_rate() * 100.0,
            self.overflowed
        )
    }
}

/// Content-addressed slot registry.
pub struct AtlasAllocator {
    layout: AtlasLayout,
    slots: HashMap<Box<[u8]>, AtlasSlot>,
    /// Slot contents in slot order
    registry: Vec<Box<[u8]>>,
    pending: VecDeque<AtlasSlot>,
    stats: AtlasStats,
    last_error: Option<AtlasError>,
}

impl AtlasAllocator {
    pub fn new(layout: AtlasLayout) -> Self {
        Self {
            layout,
            slots: HashMap::new(),
            registry: Vec::new(),
            pending: VecDeque::new(),
            stats: AtlasStats::default(),
            last_error: None,
        }
    }

    pub fn layout(&self) -> AtlasLayout {
        self.layout
    }

    pub fn capacity(&self) -> usize {
        self.layout.capacity()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Slot for `content`, assigning and queueing a new one on first sight.
    pub fn get_slot(&mut self, content: &[u8]) -> AtlasSlot {
        if let Some(&slot) = self.slots.get(content) {
            self.stats.hits += 1;
            return slot;
        }

        let slot = self.registry.len() as AtlasSlot;
        if slot as usize >= self.capacity() {
            let err = AtlasError::CapacityExceeded {
                slot,
                capacity: self.capacity(),
            };
            log::error!("{}", err);
            self.stats.overflowed += 1;
            self.last_error = Some(err);
        }

        let key: Box<[u8]> = content.into();
        self.registry.push(key.clone());
        self.slots.insert(key, slot);
        self.pending.push_back(slot);
        self.stats.assigned += 1;
        slot
    }

    /// Existing slot for `content`, without assigning.
    pub fn lookup(&self, content: &[u8]) -> Option<AtlasSlot> {
        self.slots.get(content).copied()
    }

    pub fn content(&self, slot: AtlasSlot) -> Option<&[u8]> {
        self.registry.get(slot as usize).map(|b| &b[..])
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take the slots waiting for rasterization, oldest first.
    pub fn drain_pending(&mut self) -> Vec<(AtlasSlot, &[u8])> {
        let pending: Vec<AtlasSlot> = self.pending.drain(..).collect();
        pending
            .into_iter()
            .filter_map(|slot| self.registry.get(slot as usize).map(|c| (slot, &c[..])))
            .collect()
    }

    /// Most recent capacity error, if any.
    pub fn last_error(&self) -> Option<&AtlasError> {
        self.last_error.as_ref()
    }

    pub fn stats(&self) -> AtlasStats {
        self.stats
    }

    /// Forget every slot. Previously drawn atlas regions become free.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.registry.clear();
        self.pending.clear();
        self.stats = AtlasStats::default();
        self.last_error = None;
    }
}
