use quickcheck::{Arbitrary, Gen};

use crate::{Board, BoardError, Coords, Direction, Token, TokenId};

fn dimension_in(g: &mut Gen, min: i32, max: i32) -> i32 {
    min + (u16::arbitrary(g) as i32) % (max - min + 1)
}

/// A board size and coordinates on that board.
#[derive(Clone, Debug)]
pub struct BoardInput {
    pub width: i32,
    pub height: i32,
    pub x: i32,
    pub y: i32,
}

impl Arbitrary for BoardInput {
    fn arbitrary(g: &mut Gen) -> Self {
        // Wide enough to get multi-letter columns
        let width = dimension_in(g, 2, 800);
        let height = dimension_in(g, 2, 120);
        BoardInput {
            width,
            height,
            x: dimension_in(g, 0, width - 1),
            y: dimension_in(g, 0, height - 1),
        }
    }
}

/// A token placed somewhere on a board, about to take a step.
#[derive(Clone, Debug)]
pub struct StepInput {
    pub width: i32,
    pub height: i32,
    pub dimension: i32,
    pub start: Coords,
    pub direction: Direction,
    pub steps: u32,
}

impl Arbitrary for StepInput {
    fn arbitrary(g: &mut Gen) -> Self {
        let width = dimension_in(g, 2, 12);
        let height = dimension_in(g, 2, 12);
        let dimension = dimension_in(g, 1, width.min(height));
        let start = Coords::new(
            dimension_in(g, 0, width - dimension),
            dimension_in(g, 0, height - dimension),
        );
        StepInput {
            width,
            height,
            dimension,
            start,
            direction: Direction::arbitrary(g),
            steps: u32::arbitrary(g) % 40,
        }
    }
}

impl Arbitrary for Direction {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&Direction::ALL).unwrap()
    }
}

/// One mutating call on a board. Tokens are referred to by add order, and
/// may not exist, and targets may be off the board.
#[derive(Clone, Debug)]
pub enum ScriptStep {
    Add { x: i32, y: i32, dimension: i32 },
    Move { token: usize, x: i32, y: i32 },
    MoveAlgebraic { token: usize, pos: String },
    Step { token: usize, direction: Direction, steps: u32 },
    Hide { token: usize },
    Unhide { token: usize },
    Remove { token: usize },
    Set { token: usize, key: &'static str, value: i64 },
}

impl ScriptStep {
    pub fn run(&self, board: &mut Board) -> Result<(), BoardError> {
        match self {
            ScriptStep::Add { x, y, dimension } => board
                .add((*x, *y), Token::new().with_dimension(*dimension))
                .map(|_| ()),
            ScriptStep::Move { token, x, y } => board.token_mut(TokenId(*token))?.move_to((*x, *y)),
            ScriptStep::MoveAlgebraic { token, pos } => {
                board.token_mut(TokenId(*token))?.move_to(pos)
            }
            ScriptStep::Step {
                token,
                direction,
                steps,
            } => board.token_mut(TokenId(*token))?.step(*direction, *steps),
            ScriptStep::Hide { token } => board.token_mut(TokenId(*token))?.hide(),
            ScriptStep::Unhide { token } => board.token_mut(TokenId(*token))?.unhide(),
            ScriptStep::Remove { token } => board.token_mut(TokenId(*token))?.remove(),
            ScriptStep::Set { token, key, value } => board
                .token_mut(TokenId(*token))?
                .set_property(*key, *value),
        }
    }
}

impl Arbitrary for ScriptStep {
    fn arbitrary(g: &mut Gen) -> Self {
        let token = usize::arbitrary(g) % 5;
        // Slightly past the edges of a 10x10 board, so some calls fail
        let x = dimension_in(g, -1, 10);
        let y = dimension_in(g, -1, 10);
        match u8::arbitrary(g) % 9 {
            0 | 1 => ScriptStep::Add {
                x,
                y,
                dimension: dimension_in(g, 1, 3),
            },
            2 => ScriptStep::Move { token, x, y },
            3 => ScriptStep::MoveAlgebraic {
                token,
                pos: g
                    .choose(&["A1", "b2", "C10", "J3", "Q1", "A0", "3C", ""])
                    .unwrap()
                    .to_string(),
            },
            4 => ScriptStep::Step {
                token,
                direction: Direction::arbitrary(g),
                steps: u32::arbitrary(g) % 12,
            },
            5 => ScriptStep::Hide { token },
            6 => ScriptStep::Unhide { token },
            7 => ScriptStep::Remove { token },
            _ => ScriptStep::Set {
                token,
                key: *g.choose(&["hp", "team"]).unwrap(),
                value: i64::arbitrary(g) % 100,
            },
        }
    }
}

/// A board size and a sequence of calls to make on it.
#[derive(Clone, Debug)]
pub struct Script {
    pub width: i32,
    pub height: i32,
    pub steps: Vec<ScriptStep>,
}

impl Arbitrary for Script {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 40;
        Script {
            width: dimension_in(g, 2, 10),
            height: dimension_in(g, 2, 10),
            steps: (0..len).map(|_| ScriptStep::arbitrary(g)).collect(),
        }
    }
}
