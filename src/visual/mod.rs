//! Visual tiles: how a cell is drawn.
//!
//! The visual vocabulary is two standalone flags (`ground`, `layer-top`)
//! followed by one block of nine parts per [`Feature`]. Flag indices are
//! computed arithmetically from `(feature, part)`, so the order of
//! [`Feature::ALL`] and [`Part::ALL`] is the persisted bit layout.

pub mod resolver;

pub use resolver::{resolve, resolve_neighborhood, VisualScratch};

use std::fmt;

use crate::coords::Direction;
use crate::meta::UnknownName;

/// A drawable feature: a meta property, possibly in a given sub-state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Feature {
    Grass,
    Bush,
    BushMature,
    BushHarvested,
    Tree,
    TreeMature,
    TreeHarvested,
    Flowers,
    FlowersMature,
    Rocks,
    RocksOre,
    RocksMined,
    Bricks,
    Beam,
    Drywall,
    Floor,
    Sand,
    Water,
}

pub const FEATURE_COUNT: usize = 18;

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Grass,
        Feature::Bush,
        Feature::BushMature,
        Feature::BushHarvested,
        Feature::Tree,
        Feature::TreeMature,
        Feature::TreeHarvested,
        Feature::Flowers,
        Feature::FlowersMature,
        Feature::Rocks,
        Feature::RocksOre,
        Feature::RocksMined,
        Feature::Bricks,
        Feature::Beam,
        Feature::Drywall,
        Feature::Floor,
        Feature::Sand,
        Feature::Water,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Grass => "grass",
            Feature::Bush => "bush",
            Feature::BushMature => "bush-mature",
            Feature::BushHarvested => "bush-harvested",
            Feature::Tree => "tree",
            Feature::TreeMature => "tree-mature",
            Feature::TreeHarvested => "tree-harvested",
            Feature::Flowers => "flowers",
            Feature::FlowersMature => "flowers-mature",
            Feature::Rocks => "rocks",
            Feature::RocksOre => "rocks-ore",
            Feature::RocksMined => "rocks-mined",
            Feature::Bricks => "bricks",
            Feature::Beam => "beam",
            Feature::Drywall => "drywall",
            Feature::Floor => "floor",
            Feature::Sand => "sand",
            Feature::Water => "water",
        }
    }
}

/// Which part of a cell a blend flag covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Part {
    Center,
    North,
    East,
    South,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

pub const PART_COUNT: usize = 9;

impl Part {
    pub const ALL: [Part; PART_COUNT] = [
        Part::Center,
        Part::North,
        Part::East,
        Part::South,
        Part::West,
        Part::NorthEast,
        Part::NorthWest,
        Part::SouthEast,
        Part::SouthWest,
    ];

    pub fn from_dir(dir: Direction) -> Self {
        match dir {
            Direction::N => Part::North,
            Direction::NE => Part::NorthEast,
            Direction::E => Part::East,
            Direction::SE => Part::SouthEast,
            Direction::S => Part::South,
            Direction::SW => Part::SouthWest,
            Direction::W => Part::West,
            Direction::NW => Part::NorthWest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Part::Center => "center",
            Part::North => "north",
            Part::East => "east",
            Part::South => "south",
            Part::West => "west",
            Part::NorthEast => "north-east",
            Part::NorthWest => "north-west",
            Part::SouthEast => "south-east",
            Part::SouthWest => "south-west",
        }
    }
}

/// One visual flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VisualFlag {
    /// Base ground cover, set on every cell
    Ground,
    /// Set on the top-layer variant of a pair
    LayerTop,
    Blend(Feature, Part),
}

const STANDALONE_FLAGS: usize = 2;

/// Size of the visual vocabulary
pub const VISUAL_FLAG_COUNT: usize = STANDALONE_FLAGS + FEATURE_COUNT * PART_COUNT;

/// Bytes per visual tile (one byte per 8 flags)
pub const VISUAL_BYTES: usize = (VISUAL_FLAG_COUNT + 7) / 8;

impl VisualFlag {
    pub fn index(self) -> usize {
        match self {
            VisualFlag::Ground => 0,
            VisualFlag::LayerTop => 1,
            VisualFlag::Blend(feature, part) => {
                STANDALONE_FLAGS + feature as usize * PART_COUNT + part as usize
            }
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(VisualFlag::Ground),
            1 => Some(VisualFlag::LayerTop),
            i if i < VISUAL_FLAG_COUNT => {
                let i = i - STANDALONE_FLAGS;
                Some(VisualFlag::Blend(
                    Feature::ALL[i / PART_COUNT],
                    Part::ALL[i % PART_COUNT],
                ))
            }
            _ => None,
        }
    }

    pub fn all() -> impl Iterator<Item = VisualFlag> {
        (0..VISUAL_FLAG_COUNT).filter_map(VisualFlag::from_index)
    }

    pub fn name(self) -> String {
        match self {
            VisualFlag::Ground => "ground".to_string(),
            VisualFlag::LayerTop => "layer-top".to_string(),
            VisualFlag::Blend(feature, part) => format!("{}-{}", feature.name(), part.name()),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownName> {
        VisualFlag::all()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| UnknownName::visual_flag(name))
    }

    /// # Panics
    /// If `name` is not in the vocabulary.
    pub fn by_name(name: &str) -> Self {
        match Self::from_name(name) {
            Ok(flag) => flag,
            Err(e) => panic!("{}", e),
        }
    }
}

impl fmt::Display for VisualFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Byte bitset over the visual vocabulary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VisualTile {
    bytes: [u8; VISUAL_BYTES],
}

impl Default for VisualTile {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl VisualTile {
    pub const EMPTY: VisualTile = VisualTile {
        bytes: [0; VISUAL_BYTES],
    };

    /// Tile from stored content; `None` unless exactly `VISUAL_BYTES` long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; VISUAL_BYTES] = bytes.try_into().ok()?;
        Some(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn clear(&mut self) {
        self.bytes = [0; VISUAL_BYTES];
    }

    pub fn set(&mut self, flag: VisualFlag) {
        let i = flag.index();
        self.bytes[i / 8] |= 1 << (i % 8);
    }

    pub fn unset(&mut self, flag: VisualFlag) {
        let i = flag.index();
        self.bytes[i / 8] &= !(1 << (i % 8));
    }

    pub fn has(&self, flag: VisualFlag) -> bool {
        let i = flag.index();
        self.bytes[i / 8] & (1 << (i % 8)) != 0
    }

    /// Name-based test, for call sites that know the flag by name.
    ///
    /// # Panics
    /// If `name` is not in the vocabulary.
    pub fn has_named(&self, name: &str) -> bool {
        self.has(VisualFlag::by_name(name))
    }

    pub fn flags(&self) -> impl Iterator<Item = VisualFlag> + '_ {
        VisualFlag::all().filter(move |flag| self.has(*flag))
    }

    pub fn count(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }
}

impl fmt::Debug for VisualTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.flags().map(|flag| flag.name()))
            .finish()
    }
}

/// The two visuals derived from one cell.
///
/// Both describe the same ground truth; `top` carries `layer-top` so the two
/// passes land in distinct atlas slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VisualPair {
    pub bottom: VisualTile,
    pub top: VisualTile,
}

impl VisualPair {
    pub fn from_base(base: &VisualTile) -> Self {
        let mut bottom = *base;
        bottom.unset(VisualFlag::LayerTop);
        let mut top = *base;
        top.set(VisualFlag::LayerTop);
        Self { bottom, top }
    }
}
