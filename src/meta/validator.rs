//! Self-consistency rules for meta tiles.
//!
//! The validator is an ordered chain of fixups applied exactly once, in
//! order. It is not iterated to a fixed point: a later rule sees the bits
//! earlier rules already cleared. The default chain is ordered so that
//! running it on an already valid tile changes nothing.

use super::{mask_of, MetaProperty, MetaTile};
use MetaProperty::*;

/// One fixup rule. Preconditions only look at the tile's own bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    /// If `trigger` is set, clear everything not in `keep`.
    Exclusive { trigger: MetaProperty, keep: u32 },
    /// If `target` is set and the precondition fails, clear `target`.
    ///
    /// The precondition holds when every bit of `all_of` is set, at least
    /// one bit of `any_of` is set (an empty `any_of` always holds) and no
    /// bit of `none_of` is set.
    Require {
        target: MetaProperty,
        all_of: u32,
        any_of: u32,
        none_of: u32,
    },
}

impl Rule {
    pub const fn exclusive(trigger: MetaProperty, keep: u32) -> Self {
        Rule::Exclusive {
            trigger,
            keep: keep | trigger.mask(),
        }
    }

    pub const fn requires_all(target: MetaProperty, all_of: u32) -> Self {
        Rule::Require {
            target,
            all_of,
            any_of: 0,
            none_of: 0,
        }
    }

    pub const fn requires_any(target: MetaProperty, any_of: u32) -> Self {
        Rule::Require {
            target,
            all_of: 0,
            any_of,
            none_of: 0,
        }
    }

    pub const fn forbids(target: MetaProperty, none_of: u32) -> Self {
        Rule::Require {
            target,
            all_of: 0,
            any_of: 0,
            none_of,
        }
    }

    pub fn apply(&self, tile: MetaTile) -> MetaTile {
        match *self {
            Rule::Exclusive { trigger, keep } => {
                if tile.has(trigger) {
                    MetaTile::from_bits(tile.bits() & keep)
                } else {
                    tile
                }
            }
            Rule::Require {
                target,
                all_of,
                any_of,
                none_of,
            } => {
                if !tile.has(target) {
                    return tile;
                }
                let holds = tile.has_all(all_of)
                    && (any_of == 0 || tile.has_any(any_of))
                    && !tile.has_any(none_of);
                if holds {
                    tile
                } else {
                    tile.without(target)
                }
            }
        }
    }
}

/// The default rule chain. Order matters.
///
/// Bush and plantMature each appear twice; both rules stay.
pub const DEFAULT_RULES: [Rule; 14] = [
    Rule::exclusive(Water, 0),
    Rule::exclusive(Rocks, mask_of(&[OreDeposit, Harvested, Beam])),
    Rule::requires_all(OreDeposit, Rocks.mask()),
    Rule::requires_all(Drywall, Beam.mask()),
    Rule::forbids(Bricks, Drywall.mask()),
    Rule::forbids(Sand, Floor.mask()),
    Rule::forbids(Grass, mask_of(&[Floor, Bricks, Sand])),
    Rule::requires_all(Bush, Grass.mask()),
    Rule::forbids(Bush, mask_of(&[Beam, Tree])),
    Rule::Require {
        target: Tree,
        all_of: Grass.mask(),
        any_of: 0,
        none_of: Beam.mask(),
    },
    Rule::Require {
        target: Flowers,
        all_of: Grass.mask(),
        any_of: 0,
        none_of: mask_of(&[Bush, Tree]),
    },
    Rule::requires_any(PlantMature, mask_of(&[Bush, Tree, Flowers])),
    Rule::requires_any(Harvested, mask_of(&[Bush, Tree, OreDeposit])),
    Rule::forbids(PlantMature, Harvested.mask()),
];

/// Ordered rule chain.
#[derive(Clone, Debug)]
pub struct Validator {
    rules: Vec<Rule>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.to_vec())
    }
}

impl Validator {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every rule once, in order.
    pub fn validate(&self, tile: MetaTile) -> MetaTile {
        self.rules.iter().fold(tile, |tile, rule| rule.apply(tile))
    }

    pub fn is_valid(&self, tile: MetaTile) -> bool {
        self.validate(tile) == tile
    }
}
