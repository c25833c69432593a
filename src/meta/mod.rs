//! Meta tiles: what occupies a world cell.
//!
//! A [`MetaTile`] is a `u32` bitset over the ordered [`MetaProperty`]
//! vocabulary. The enum discriminant *is* the bit position, so the variant
//! order is a persisted layout: never reorder, only append.

pub mod grid;
pub mod validator;

pub use grid::{GridStats, MetaGrid, Neighborhood};
pub use validator::{Rule, Validator};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered meta property vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
#[repr(u8)]
pub enum MetaProperty {
    Floor = 0,
    Beam = 1,
    Bricks = 2,
    Drywall = 3,
    Grass = 4,
    Bush = 5,
    Rocks = 6,
    OreDeposit = 7,
    Harvested = 8,
    PlantMature = 9,
    Sand = 10,
    Water = 11,
    Tree = 12,
    Flowers = 13,
}

/// Number of meta properties (must stay <= 32)
pub const PROPERTY_COUNT: usize = 14;

const _: () = assert!(PROPERTY_COUNT <= 32);

impl MetaProperty {
    pub const ALL: [MetaProperty; PROPERTY_COUNT] = [
        MetaProperty::Floor,
        MetaProperty::Beam,
        MetaProperty::Bricks,
        MetaProperty::Drywall,
        MetaProperty::Grass,
        MetaProperty::Bush,
        MetaProperty::Rocks,
        MetaProperty::OreDeposit,
        MetaProperty::Harvested,
        MetaProperty::PlantMature,
        MetaProperty::Sand,
        MetaProperty::Water,
        MetaProperty::Tree,
        MetaProperty::Flowers,
    ];

    pub const fn bit(self) -> u32 {
        self as u32
    }

    pub const fn mask(self) -> u32 {
        1 << (self as u32)
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            MetaProperty::Floor => "floor",
            MetaProperty::Beam => "beam",
            MetaProperty::Bricks => "bricks",
            MetaProperty::Drywall => "drywall",
            MetaProperty::Grass => "grass",
            MetaProperty::Bush => "bush",
            MetaProperty::Rocks => "rocks",
            MetaProperty::OreDeposit => "oreDeposit",
            MetaProperty::Harvested => "harvested",
            MetaProperty::PlantMature => "plantMature",
            MetaProperty::Sand => "sand",
            MetaProperty::Water => "water",
            MetaProperty::Tree => "tree",
            MetaProperty::Flowers => "flowers",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, UnknownName> {
        MetaProperty::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| UnknownName::property(name))
    }

    /// Name lookup for names known at the call site.
    ///
    /// # Panics
    /// If `name` is not in the vocabulary.
    pub fn by_name(name: &str) -> Self {
        match Self::from_name(name) {
            Ok(property) => property,
            Err(e) => panic!("{}", e),
        }
    }
}

impl TryFrom<String> for MetaProperty {
    type Error = UnknownName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::from_name(&name)
    }
}

impl From<MetaProperty> for String {
    fn from(property: MetaProperty) -> Self {
        property.name().to_string()
    }
}

impl fmt::Display for MetaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A name that is not part of a vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownName {
    pub vocabulary: &'static str,
    pub name: String,
}

impl UnknownName {
    pub fn property(name: &str) -> Self {
        Self {
            vocabulary: "meta property",
            name: name.to_string(),
        }
    }

    pub fn visual_flag(name: &str) -> Self {
        Self {
            vocabulary: "visual flag",
            name: name.to_string(),
        }
    }
}

impl fmt::Display for UnknownName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} name: {:?}", self.vocabulary, self.name)
    }
}

impl std::error::Error for UnknownName {}

/// Bitset of meta properties for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetaTile(u32);

impl MetaTile {
    pub const EMPTY: MetaTile = MetaTile(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub fn from_properties(properties: &[MetaProperty]) -> Self {
        Self(properties.iter().fold(0, |acc, p| acc | p.mask()))
    }

    pub fn has(self, property: MetaProperty) -> bool {
        self.0 & property.mask() != 0
    }

    pub fn has_all(self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    pub fn has_any(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    pub fn with(self, property: MetaProperty) -> Self {
        Self(self.0 | property.mask())
    }

    pub fn without(self, property: MetaProperty) -> Self {
        Self(self.0 & !property.mask())
    }

    pub fn toggled(self, property: MetaProperty) -> Self {
        Self(self.0 ^ property.mask())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set properties in vocabulary order.
    pub fn properties(self) -> impl Iterator<Item = MetaProperty> {
        MetaProperty::ALL.into_iter().filter(move |p| self.has(*p))
    }
}

impl fmt::Display for MetaTile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("[]");
        }
        let names: Vec<&str> = self.properties().map(|p| p.name()).collect();
        write!(f, "[{}]", names.join(","))
    }
}

/// OR together the masks of several properties.
pub const fn mask_of(properties: &[MetaProperty]) -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < properties.len() {
        mask |= properties[i].mask();
        i += 1;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_follow_vocabulary_order() {
        for (i, property) in MetaProperty::ALL.iter().enumerate() {
            assert_eq!(property.index(), i);
            assert_eq!(property.mask(), 1 << i);
        }
    }

    #[test]
    fn test_name_round_trip_and_unknown() {
        for property in MetaProperty::ALL {
            assert_eq!(MetaProperty::from_name(property.name()), Ok(property));
        }
        let err = MetaProperty::from_name("lava").unwrap_err();
        assert_eq!(err.name, "lava");
        assert!(err.to_string().contains("meta property"));
    }

    #[test]
    #[should_panic(expected = "unknown meta property name")]
    fn test_by_name_panics_on_unknown() {
        MetaProperty::by_name("unobtainium");
    }

    #[test]
    fn test_tile_bit_ops() {
        let tile = MetaTile::EMPTY.with(MetaProperty::Grass).with(MetaProperty::Bush);
        assert!(tile.has(MetaProperty::Grass));
        assert!(tile.has_all(mask_of(&[MetaProperty::Grass, MetaProperty::Bush])));
        assert!(!tile.without(MetaProperty::Bush).has(MetaProperty::Bush));
        assert_eq!(tile.toggled(MetaProperty::Bush).toggled(MetaProperty::Bush), tile);
        assert_eq!(tile.to_string(), "[grass,bush]");
    }

    #[test]
    fn test_property_serde_uses_names() {
        let json = serde_json::to_string(&MetaProperty::OreDeposit).unwrap();
        assert_eq!(json, "\"oreDeposit\"");
        let back: MetaProperty = serde_json::from_str("\"plantMature\"").unwrap();
        assert_eq!(back, MetaProperty::PlantMature);
        assert!(serde_json::from_str::<MetaProperty>("\"lava\"").is_err());
    }
}
