//! World coordinates and the Moore neighbourhood.
//!
//! The world is an unbounded integer grid. `y` grows southward, so north of
//! `(x, y)` is `(x, y - 1)`.

use serde::{Deserialize, Serialize};

/// A world cell coordinate.
///
/// Ordered row-major (`y` first) so dirty sets drain in reading order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i64,
    pub y: i64,
}

impl Coord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        self.offset(dx, dy)
    }

    pub fn north(self) -> Self {
        self.step(Direction::N)
    }

    pub fn south(self) -> Self {
        self.step(Direction::S)
    }

    /// The 3x3 block centred on this cell, itself included, in row-major order.
    pub fn block3x3(self) -> impl Iterator<Item = Coord> {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dx| self.offset(dx, dy)))
    }

    /// The 8 surrounding cells in [`Direction::ALL`] order.
    pub fn moore(self) -> impl Iterator<Item = Coord> {
        Direction::ALL.into_iter().map(move |dir| self.step(dir))
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<(i64, i64)> for Coord {
    fn from((x, y): (i64, i64)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Moore neighbourhood directions.
/// Order: N, NE, E, SE, S, SW, W, NW
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

/// Direction offsets (dx, dy), indexed by `Direction as usize`
pub const DIR_OFFSETS: [(i64, i64); 8] = [
    (0, -1),  // N
    (1, -1),  // NE
    (1, 0),   // E
    (1, 1),   // SE
    (0, 1),   // S
    (-1, 1),  // SW
    (-1, 0),  // W
    (-1, -1), // NW
];

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub const CARDINALS: [Direction; 4] = [Direction::N, Direction::E, Direction::S, Direction::W];

    pub const DIAGONALS: [Direction; 4] = [Direction::NE, Direction::NW, Direction::SE, Direction::SW];

    pub fn offset(self) -> (i64, i64) {
        DIR_OFFSETS[self as usize]
    }

    /// The two cardinal directions flanking a diagonal, `None` for cardinals.
    pub fn flanking(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NE => Some((Direction::N, Direction::E)),
            Direction::SE => Some((Direction::S, Direction::E)),
            Direction::SW => Some((Direction::S, Direction::W)),
            Direction::NW => Some((Direction::N, Direction::W)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::N => "north",
            Direction::NE => "north-east",
            Direction::E => "east",
            Direction::SE => "south-east",
            Direction::S => "south",
            Direction::SW => "south-west",
            Direction::W => "west",
            Direction::NW => "north-west",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_row_major() {
        let mut coords = vec![Coord::new(1, 0), Coord::new(0, 1), Coord::new(-1, 0)];
        coords.sort();
        assert_eq!(coords, vec![Coord::new(-1, 0), Coord::new(1, 0), Coord::new(0, 1)]);
    }

    #[test]
    fn test_block_and_moore() {
        let c = Coord::new(5, -3);
        let block: Vec<_> = c.block3x3().collect();
        assert_eq!(block.len(), 9);
        assert!(block.contains(&c));

        let moore: Vec<_> = c.moore().collect();
        assert_eq!(moore.len(), 8);
        assert!(!moore.contains(&c));
        assert!(moore.iter().all(|n| block.contains(n)));
    }

    #[test]
    fn test_flanking_directions() {
        assert_eq!(Direction::NE.flanking(), Some((Direction::N, Direction::E)));
        assert_eq!(Direction::SW.flanking(), Some((Direction::S, Direction::W)));
        assert_eq!(Direction::E.flanking(), None);
        assert_eq!(Coord::new(0, 0).north(), Coord::new(0, -1));
    }
}
