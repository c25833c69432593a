//! Seed management for meta property noise
//!
//! Every meta property gets its own noise seed, derived from a master seed by
//! default. Individual seeds can be overridden for experimentation without
//! disturbing the others.

use crate::meta::{MetaProperty, PROPERTY_COUNT};

/// Seeds for all property noise layers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    properties: [u64; PROPERTY_COUNT],
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        let mut properties = [0; PROPERTY_COUNT];
        for property in MetaProperty::ALL {
            properties[property.index()] = derive_seed(master, property.index() as u64);
        }
        Self { master, properties }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }

    pub fn property(&self, property: MetaProperty) -> u64 {
        self.properties[property.index()]
    }

    /// Seed for the `field`-th noise field of a property's layer stack.
    pub fn field_seed(&self, property: MetaProperty, field: usize) -> u32 {
        let seed = if field == 0 {
            self.property(property)
        } else {
            derive_seed(self.property(property), field as u64)
        };
        (seed ^ (seed >> 32)) as u32
    }
}

/// Seeds from a random master
impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    /// Override the seed of one property
    pub fn property(mut self, property: MetaProperty, seed: u64) -> Self {
        self.seeds.properties[property.index()] = seed;
        self
    }

    /// Build the final WorldSeeds
    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a sub-seed from a master seed and a stream index.
/// Stable across runs and platforms.
fn derive_seed(master: u64, stream: u64) -> u64 {
    splitmix64(master ^ splitmix64(stream.wrapping_add(1)))
}

/// Display format for seeds (useful for sharing world configurations)
impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WorldSeeds {{ master: {}", self.master)?;
        for property in MetaProperty::ALL {
            write!(f, ", {}: {}", property.name(), self.property(property))?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = WorldSeeds::from_master(12345);
        let seeds2 = WorldSeeds::from_master(12345);

        assert_eq!(seeds1, seeds2);
        assert_eq!(
            seeds1.field_seed(MetaProperty::Grass, 2),
            seeds2.field_seed(MetaProperty::Grass, 2)
        );
    }

    #[test]
    fn test_different_properties_get_different_seeds() {
        let seeds = WorldSeeds::from_master(12345);

        assert_ne!(seeds.property(MetaProperty::Grass), seeds.property(MetaProperty::Bush));
        assert_ne!(seeds.property(MetaProperty::Bush), seeds.property(MetaProperty::Rocks));
        assert_ne!(
            seeds.field_seed(MetaProperty::Grass, 0),
            seeds.field_seed(MetaProperty::Grass, 1)
        );
    }

    #[test]
    fn test_builder_override() {
        let seeds = WorldSeeds::builder(12345)
            .property(MetaProperty::Rocks, 99999)
            .build();

        assert_eq!(seeds.property(MetaProperty::Rocks), 99999);

        let default_seeds = WorldSeeds::from_master(12345);
        assert_eq!(seeds.property(MetaProperty::Grass), default_seeds.property(MetaProperty::Grass));
        assert!(seeds.to_string().contains("rocks: 99999"));
    }

    #[test]
    fn test_default_derives_from_its_master() {
        let seeds = WorldSeeds::default();
        assert_eq!(seeds, WorldSeeds::from_master(seeds.master));
    }
}
