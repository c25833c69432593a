//! Incremental redraw of a toroidal scroll cache.
//!
//! A fixed-size cache stands for a window of an infinite surface. World
//! position `(wx, wy)` always lives at physical `(wx mod width, wy mod height)`,
//! so when the window moves only the strips that entered it need drawing.
//! A strip that straddles the physical wrap is split so every region handed
//! to the redraw callback lies inside the cache.
//!
//! Per move at most two world strips are produced (one per axis) and each
//! splits into at most four physical regions.

/// Largest offset magnitude on either axis. Offsets beyond it are clamped,
/// which keeps every strip computation inside `i64`.
pub const MAX_OFFSET: i64 = 1 << 52;

/// Clamp a whole-cell offset into `[-MAX_OFFSET, MAX_OFFSET]`.
pub fn clamp_offset(value: i64) -> i64 {
    value.clamp(-MAX_OFFSET, MAX_OFFSET)
}

/// Rectangle in world space. Width and height are positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldRect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl WorldRect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        self.width * self.height
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Every position inside, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (i64, i64)> {
        let WorldRect {
            x,
            y,
            width,
            height,
        } = *self;
        (y..y + height).flat_map(move |wy| (x..x + width).map(move |wx| (wx, wy)))
    }
}

/// One physical rectangle of the cache to redraw.
///
/// `(world_x, world_y)` is the world position that lands on the region's
/// top-left pixel. The callback must not draw outside the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub world_x: i64,
    pub world_y: i64,
}

impl CacheRegion {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// World rectangles that entered a window of size `extent` when its anchor
/// moved from `old` to `new`.
///
/// The horizontal strip (columns entered) spans only the rows shared by both
/// windows; the vertical strip (rows entered) spans the full new column
/// range, so the two never overlap. A move of a whole extent or more on
/// either axis returns the full new window.
pub fn entered_regions(old: (i64, i64), new: (i64, i64), extent: (i64, i64)) -> Vec<WorldRect> {
    let (width, height) = extent;
    let full = || vec![WorldRect::new(new.0, new.1, width, height)];
    let (Some(dx), Some(dy)) = (new.0.checked_sub(old.0), new.1.checked_sub(old.1)) else {
        return full();
    };

    if dx == 0 && dy == 0 {
        return Vec::new();
    }
    if dx.unsigned_abs() >= width as u64 || dy.unsigned_abs() >= height as u64 {
        return full();
    }

    let mut rects = Vec::with_capacity(2);

    if dx != 0 {
        let x = if dx > 0 { old.0.wrapping_add(width) } else { new.0 };
        let shared_y = old.1.max(new.1);
        rects.push(WorldRect::new(x, shared_y, dx.abs(), height - dy.abs()));
    }

    if dy != 0 {
        let y = if dy > 0 { old.1.wrapping_add(height) } else { new.1 };
        rects.push(WorldRect::new(new.0, y, width, dy.abs()));
    }

    rects
}

/// Split a world rectangle into physical regions of a `width x height` cache.
///
/// The rectangle must be no larger than the cache on either axis.
pub fn split_wrapped(rect: WorldRect, width: u32, height: u32) -> Vec<CacheRegion> {
    debug_assert!(rect.width <= width as i64 && rect.height <= height as i64);

    let xs = split_axis(rect.x, rect.width, width as i64);
    let ys = split_axis(rect.y, rect.height, height as i64);

    let mut regions = Vec::with_capacity(4);
    for &(py, world_y, h) in &ys {
        for &(px, world_x, w) in &xs {
            regions.push(CacheRegion {
                x: px as u32,
                y: py as u32,
                width: w as u32,
                height: h as u32,
                world_x,
                world_y,
            });
        }
    }
    regions
}

/// `(physical start, world start, length)` runs of one axis: the tail run
/// up to the physical edge, then the head run from 0 if the span wraps.
fn split_axis(start: i64, len: i64, resolution: i64) -> Vec<(i64, i64, i64)> {
    let phys = start.rem_euclid(resolution);
    let first = len.min(resolution - phys);
    let mut runs = vec![(phys, start, first)];
    if first < len {
        runs.push((0, start.wrapping_add(first), len - first));
    }
    runs
}

/// Toroidal cache bookkeeping: which regions to redraw as the offset moves.
#[derive(Clone, Debug)]
pub struct ScrollCacheSplitter {
    width: u32,
    height: u32,
    /// Baseline offset of the last render, `None` until the first fill
    offset: Option<(i64, i64)>,
}

impl ScrollCacheSplitter {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            offset: None,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn offset(&self) -> Option<(i64, i64)> {
        self.offset
    }

    pub fn is_filled(&self) -> bool {
        self.offset.is_some()
    }

    /// Force the next render to redraw everything.
    pub fn invalidate(&mut self) {
        self.offset = None;
    }

    /// Bring the cache to `(new_x, new_y)` (rounded to whole pixels and
    /// clamped to [`MAX_OFFSET`]), invoking `redraw` once per physical
    /// region. Returns the region count.
    pub fn render<F>(&mut self, new_x: f64, new_y: f64, mut redraw: F) -> usize
    where
        F: FnMut(&CacheRegion),
    {
        let new = (
            clamp_offset(new_x.round() as i64),
            clamp_offset(new_y.round() as i64),
        );
        let extent = (self.width as i64, self.height as i64);

        let rects = match self.offset {
            None => vec![WorldRect::new(new.0, new.1, extent.0, extent.1)],
            Some(old) => entered_regions(old, new, extent),
        };

        let mut drawn = 0;
        for rect in rects {
            for region in split_wrapped(rect, self.width, self.height) {
                redraw(&region);
                drawn += 1;
            }
        }

        self.offset = Some(new);
        drawn
    }
}
