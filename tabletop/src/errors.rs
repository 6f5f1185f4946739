use crate::label::LabelError;
use crate::TokenId;

/// Which end of the history log was reached by [`Board::undo()`](crate::Board::undo)
/// or [`Board::redo()`](crate::Board::redo).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryEnd {
    /// There is nothing left to undo.
    Start,
    /// There is nothing left to redo.
    End,
}

/// The error type for all board and token operations.
///
/// A call that fails with any of these leaves the board unmodified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BoardError {
    InvalidDimensions {
        width: i32,
        height: i32,
    },
    /// A token must cover at least one cell.
    InvalidTokenDimension(i32),
    MalformedPosition {
        position: String,
        label_err: Option<LabelError>,
    },
    OutOfBounds {
        x: i64,
        y: i64,
    },
    HistoryExhausted(HistoryEnd),
    DuplicateAttachment,
    /// Reserved for single-occupancy enforcement, which is not implemented.
    AlreadyOccupied {
        x: i32,
        y: i32,
    },
    UnknownToken(TokenId),
    /// The token is not on the grid, i.e. it was removed or its creation was undone.
    TokenDetached(TokenId),
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::MalformedPosition {
                label_err: Some(err),
                ..
            } => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::InvalidDimensions { width, height } => write!(
                f,
                "A board must be at least 2x2 cells, but {}x{} was requested",
                width, height
            ),
            BoardError::InvalidTokenDimension(dimension) => write!(
                f,
                "A token must cover at least 1x1 cells, but its dimension is {}",
                dimension
            ),
            BoardError::MalformedPosition { position, .. } => {
                write!(f, "{:?} is not a position like \"C3\"", position)
            }
            BoardError::OutOfBounds { x, y } => {
                write!(f, "Coordinates ({}, {}) are out of the bounds of the board", x, y)
            }
            BoardError::HistoryExhausted(HistoryEnd::Start) => write!(f, "There is nothing to undo"),
            BoardError::HistoryExhausted(HistoryEnd::End) => write!(f, "There is nothing to redo"),
            BoardError::DuplicateAttachment => {
                write!(f, "The token has already been added to a board")
            }
            BoardError::AlreadyOccupied { x, y } => {
                write!(f, "The cell ({}, {}) is already occupied", x, y)
            }
            BoardError::UnknownToken(id) => write!(f, "There is no token {} on this board", id),
            BoardError::TokenDetached(id) => {
                write!(f, "Token {} is not placed on the board", id)
            }
        }
    }
}
