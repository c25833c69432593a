//! Meta → visual derivation.
//!
//! A cell's visual depends only on its own meta tile and its 8 neighbours.
//! For every blended property:
//!
//! - `center` when the cell itself has the property;
//! - a cardinal edge when that neighbour has it, unless both cells have it in
//!   different sub-states (that boundary is drawn hard, without a blend);
//! - a diagonal corner only when the diagonal neighbour and both flanking
//!   cardinals share the same variant.
//!
//! Flags are named after the *neighbour's* variant, so a harvested bush next
//! to a plain cell emits `bush-harvested-*` edges.

use super::{Feature, Part, VisualFlag, VisualPair, VisualTile};
use crate::coords::{Coord, Direction};
use crate::meta::{MetaGrid, MetaProperty, MetaTile, Neighborhood};

/// Properties that get edge blending, in emission order.
pub const BLENDED: [MetaProperty; 11] = [
    MetaProperty::Grass,
    MetaProperty::Bush,
    MetaProperty::Tree,
    MetaProperty::Flowers,
    MetaProperty::Rocks,
    MetaProperty::Bricks,
    MetaProperty::Beam,
    MetaProperty::Drywall,
    MetaProperty::Floor,
    MetaProperty::Sand,
    MetaProperty::Water,
];

/// Visual feature for `property` on `tile`, `None` when absent.
pub fn variant(property: MetaProperty, tile: MetaTile) -> Option<Feature> {
    if !tile.has(property) {
        return None;
    }

    let harvested = tile.has(MetaProperty::Harvested);
    let mature = tile.has(MetaProperty::PlantMature);

    let feature = match property {
        MetaProperty::Grass => Feature::Grass,
        MetaProperty::Bush if harvested => Feature::BushHarvested,
        MetaProperty::Bush if mature => Feature::BushMature,
        MetaProperty::Bush => Feature::Bush,
        MetaProperty::Tree if harvested => Feature::TreeHarvested,
        MetaProperty::Tree if mature => Feature::TreeMature,
        MetaProperty::Tree => Feature::Tree,
        MetaProperty::Flowers if mature => Feature::FlowersMature,
        MetaProperty::Flowers => Feature::Flowers,
        MetaProperty::Rocks if tile.has(MetaProperty::OreDeposit) && harvested => {
            Feature::RocksMined
        }
        MetaProperty::Rocks if tile.has(MetaProperty::OreDeposit) => Feature::RocksOre,
        MetaProperty::Rocks => Feature::Rocks,
        MetaProperty::Bricks => Feature::Bricks,
        MetaProperty::Beam => Feature::Beam,
        MetaProperty::Drywall => Feature::Drywall,
        MetaProperty::Floor => Feature::Floor,
        MetaProperty::Sand => Feature::Sand,
        MetaProperty::Water => Feature::Water,
        // sub-state bits are never blended on their own
        MetaProperty::OreDeposit | MetaProperty::Harvested | MetaProperty::PlantMature => {
            return None
        }
    };

    Some(feature)
}

/// Caller-owned working memory for [`resolve`].
///
/// Reusing one scratch across calls avoids re-zeroing fresh buffers; each
/// resolving thread needs its own.
#[derive(Clone, Debug, Default)]
pub struct VisualScratch {
    base: VisualTile,
    center: Option<Feature>,
    /// Neighbour variants indexed by `Direction as usize`
    around: [Option<Feature>; 8],
}

impl VisualScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&mut self, property: MetaProperty, hood: &Neighborhood) {
        self.center = variant(property, hood.center);
        for dir in Direction::ALL {
            self.around[dir as usize] = variant(property, hood.get(dir));
        }
    }

    fn at(&self, dir: Direction) -> Option<Feature> {
        self.around[dir as usize]
    }

    /// A neighbour variant blends in unless the centre holds a different one.
    fn accepts(&self, feature: Feature) -> bool {
        self.center.map_or(true, |own| own == feature)
    }

    fn blend(&mut self) {
        if let Some(own) = self.center {
            self.base.set(VisualFlag::Blend(own, Part::Center));
        }

        for dir in Direction::CARDINALS {
            if let Some(feature) = self.at(dir) {
                if self.accepts(feature) {
                    self.base.set(VisualFlag::Blend(feature, Part::from_dir(dir)));
                }
            }
        }

        for dir in Direction::DIAGONALS {
            let Some(feature) = self.at(dir) else {
                continue;
            };
            let Some((a, b)) = dir.flanking() else {
                continue;
            };
            if self.at(a) == Some(feature) && self.at(b) == Some(feature) && self.accepts(feature) {
                self.base.set(VisualFlag::Blend(feature, Part::from_dir(dir)));
            }
        }
    }
}

/// Derive the visual pair for an already sampled neighbourhood.
pub fn resolve_neighborhood(hood: &Neighborhood, scratch: &mut VisualScratch) -> VisualPair {
    scratch.base.clear();
    scratch.base.set(VisualFlag::Ground);

    for property in BLENDED {
        scratch.load(property, hood);
        scratch.blend();
    }

    VisualPair::from_base(&scratch.base)
}

/// Sample `coord` and its neighbours from the grid and derive its visuals.
pub fn resolve(grid: &mut MetaGrid, coord: Coord, scratch: &mut VisualScratch) -> VisualPair {
    let hood = grid.neighborhood(coord);
    resolve_neighborhood(&hood, scratch)
}
