//! Memoized meta tile grid over the infinite world.
//!
//! Tiles are derived lazily from per-property noise layers the first time a
//! cell is sampled, validated, and cached for good. Explicit writes bypass
//! the noise, are validated the same way, and mark the cell dirty so the
//! viewport can re-resolve the visuals around it.

use std::collections::{BTreeSet, HashMap};

use super::{MetaProperty, MetaTile, Validator};
use crate::coords::{Coord, Direction};
use crate::noise_field::LayeredNoise;

/// Noise stack that decides one property bit.
#[derive(Clone, Debug)]
pub struct PropertyLayer {
    pub property: MetaProperty,
    pub noise: LayeredNoise,
    pub threshold: f64,
}

impl PropertyLayer {
    pub fn new(property: MetaProperty, noise: LayeredNoise, threshold: f64) -> Self {
        Self {
            property,
            noise,
            threshold,
        }
    }

    fn sample(&self, coord: Coord) -> u32 {
        if self.noise.threshold(coord.x, coord.y, self.threshold) {
            self.property.mask()
        } else {
            0
        }
    }
}

/// Grid statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridStats {
    /// Samples answered from the cache
    pub hits: usize,
    /// Samples that ran the noise layers
    pub derived: usize,
    /// Explicit writes
    pub writes: usize,
}

/// A cell and its Moore neighbourhood, as sampled from the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Neighborhood {
    pub center: MetaTile,
    /// Neighbours indexed by `Direction as usize`
    pub neighbors: [MetaTile; 8],
}

impl Neighborhood {
    pub fn get(&self, dir: Direction) -> MetaTile {
        self.neighbors[dir as usize]
    }
}

/// Memoized, writable meta tile grid.
pub struct MetaGrid {
    layers: Vec<PropertyLayer>,
    validator: Validator,
    cache: HashMap<Coord, MetaTile>,
    dirty: BTreeSet<Coord>,
    stats: GridStats,
}

impl MetaGrid {
    pub fn new(layers: Vec<PropertyLayer>, validator: Validator) -> Self {
        Self {
            layers,
            validator,
            cache: HashMap::new(),
            dirty: BTreeSet::new(),
            stats: GridStats::default(),
        }
    }

    /// A grid with no noise layers: every unwritten cell is empty.
    pub fn blank() -> Self {
        Self::new(Vec::new(), Validator::default())
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn layers(&self) -> &[PropertyLayer] {
        &self.layers
    }

    /// Noise-derived tile before validation. Not cached.
    pub fn derive_raw(&self, coord: Coord) -> MetaTile {
        let bits = self
            .layers
            .iter()
            .fold(0, |acc, layer| acc | layer.sample(coord));
        MetaTile::from_bits(bits)
    }

    /// Validated tile at `coord`, derived and cached on first use.
    pub fn sample(&mut self, coord: Coord) -> MetaTile {
        if let Some(&tile) = self.cache.get(&coord) {
            self.stats.hits += 1;
            return tile;
        }

        let tile = self.validator.validate(self.derive_raw(coord));
        self.stats.derived += 1;
        self.cache.insert(coord, tile);
        tile
    }

    /// Cached tile, if the cell has been sampled or written.
    pub fn peek(&self, coord: Coord) -> Option<MetaTile> {
        self.cache.get(&coord).copied()
    }

    /// Store an explicit tile. Returns the validated value actually stored.
    pub fn write(&mut self, coord: Coord, raw: MetaTile) -> MetaTile {
        let tile = self.validator.validate(raw);
        self.cache.insert(coord, tile);
        self.dirty.insert(coord);
        self.stats.writes += 1;
        tile
    }

    /// Toggle one property bit. Returns the validated value actually stored.
    pub fn flip(&mut self, coord: Coord, property: MetaProperty) -> MetaTile {
        let current = self.sample(coord);
        self.write(coord, current.toggled(property))
    }

    /// Sample a cell and its 8 neighbours.
    pub fn neighborhood(&mut self, coord: Coord) -> Neighborhood {
        let center = self.sample(coord);
        let mut neighbors = [MetaTile::EMPTY; 8];
        for dir in Direction::ALL {
            neighbors[dir as usize] = self.sample(coord.step(dir));
        }
        Neighborhood { center, neighbors }
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Drain the written-but-not-propagated set.
    pub fn take_dirty(&mut self) -> BTreeSet<Coord> {
        std::mem::take(&mut self.dirty)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> GridStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NoiseField;
    use crate::meta::MetaProperty::*;

    fn noisy_grid(seed: u32) -> MetaGrid {
        let layers = vec![
            PropertyLayer::new(
                Grass,
                LayeredNoise::new(vec![NoiseField::new(seed, 6.3, (0.37, 0.61), 1.0)]),
                -0.1,
            ),
            PropertyLayer::new(
                Bush,
                LayeredNoise::new(vec![
                    NoiseField::new(seed + 1, 3.1, (0.21, 0.77), 1.0),
                    NoiseField::new(seed + 2, 11.9, (0.53, 0.19), 0.5),
                ]),
                0.2,
            ),
            PropertyLayer::new(
                Rocks,
                LayeredNoise::new(vec![NoiseField::new(seed + 3, 8.7, (0.11, 0.29), 1.0)]),
                0.35,
            ),
        ];
        MetaGrid::new(layers, Validator::default())
    }

    #[test]
    fn test_sample_is_deterministic() {
        let mut a = noisy_grid(9);
        let mut b = noisy_grid(9);

        for y in -15..15 {
            for x in -15..15 {
                let c = Coord::new(x, y);
                let first = a.sample(c);
                assert_eq!(a.sample(c), first);
                assert_eq!(b.sample(c), first);
            }
        }
        assert_eq!(a.stats().derived, 900);
        assert_eq!(a.stats().hits, 900);
    }

    #[test]
    fn test_sampled_tiles_are_valid() {
        let mut grid = noisy_grid(3);
        for y in 0..40 {
            for x in 0..40 {
                let tile = grid.sample(Coord::new(x, y));
                assert!(grid.validator().is_valid(tile), "{} at ({},{})", tile, x, y);
            }
        }
    }

    #[test]
    fn test_write_validates_and_marks_dirty() {
        let mut grid = MetaGrid::blank();
        let c = Coord::new(4, -2);

        let stored = grid.write(c, MetaTile::from_properties(&[Bush]));
        assert_eq!(stored, MetaTile::EMPTY);
        assert_eq!(grid.sample(c), MetaTile::EMPTY);

        let stored = grid.write(c, MetaTile::from_properties(&[Grass, Bush]));
        assert_eq!(stored, MetaTile::from_properties(&[Grass, Bush]));

        let dirty = grid.take_dirty();
        assert_eq!(dirty.into_iter().collect::<Vec<_>>(), vec![c]);
        assert!(!grid.has_dirty());
    }

    #[test]
    fn test_peek_never_derives() {
        let mut grid = noisy_grid(5);
        let c = Coord::new(-3, 8);
        assert_eq!(grid.peek(c), None);
        assert_eq!(grid.cached_len(), 0);

        let tile = grid.sample(c);
        assert_eq!(grid.peek(c), Some(tile));
        assert_eq!(grid.stats().derived, 1);
    }

    #[test]
    fn test_write_overrides_noise() {
        let mut grid = noisy_grid(5);
        let c = Coord::new(1, 1);
        grid.sample(c);
        grid.write(c, MetaTile::from_properties(&[Water]));
        assert_eq!(grid.sample(c), MetaTile::from_properties(&[Water]));
    }

    #[test]
    fn test_flip_toggles_one_bit() {
        let mut grid = MetaGrid::blank();
        let c = Coord::new(0, 0);

        assert!(grid.flip(c, Grass).has(Grass));
        assert!(grid.flip(c, Flowers).has(Flowers));
        let tile = grid.flip(c, Grass);
        // flowers need grass
        assert_eq!(tile, MetaTile::EMPTY);
    }

    #[test]
    fn test_neighborhood_directions() {
        let mut grid = MetaGrid::blank();
        let c = Coord::new(10, 10);
        grid.write(c.offset(1, -1), MetaTile::from_properties(&[Sand]));
        grid.write(c.offset(-1, 0), MetaTile::from_properties(&[Floor]));

        let hood = grid.neighborhood(c);
        assert!(hood.get(Direction::NE).has(Sand));
        assert!(hood.get(Direction::W).has(Floor));
        assert!(hood.center.is_empty());
        assert!(hood.get(Direction::SW).is_empty());
    }
}
