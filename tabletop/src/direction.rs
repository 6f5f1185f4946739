use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the eight unit steps on the grid.
///
/// `y` grows downwards, so [`Direction::U`] decreases it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    L,
    R,
    U,
    D,
    UL,
    UR,
    DL,
    DR,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::L,
        Direction::R,
        Direction::U,
        Direction::D,
        Direction::UL,
        Direction::UR,
        Direction::DL,
        Direction::DR,
    ];

    /// The `(dx, dy)` grid delta of a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::L => (-1, 0),
            Direction::R => (1, 0),
            Direction::U => (0, -1),
            Direction::D => (0, 1),
            Direction::UL => (-1, -1),
            Direction::UR => (1, -1),
            Direction::DL => (-1, 1),
            Direction::DR => (1, 1),
        }
    }
}

/// The error type for the [`FromStr`] instance of [`Direction`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectionFromStrErr(pub String);

impl std::error::Error for DirectionFromStrErr {}

impl std::fmt::Display for DirectionFromStrErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} is not one of L, R, U, D, UL, UR, DL, DR", self.0)
    }
}

impl FromStr for Direction {
    type Err = DirectionFromStrErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Direction::L),
            "R" => Ok(Direction::R),
            "U" => Ok(Direction::U),
            "D" => Ok(Direction::D),
            "UL" => Ok(Direction::UL),
            "UR" => Ok(Direction::UR),
            "DL" => Ok(Direction::DL),
            "DR" => Ok(Direction::DR),
            _ => Err(DirectionFromStrErr(String::from(s))),
        }
    }
}
