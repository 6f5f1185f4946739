use std::collections::BTreeMap;
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::label::{self, LabelError};
use crate::{BoardError, HistoryEnd, HistoryRecord, Token, TokenId, TokenMut, TokenState};

/// Zero-based grid coordinates. `x` is the column, `y` the row, counted from the top left.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coords {
    pub x: i32,
    pub y: i32,
}

impl Coords {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Renders these coordinates as a position like `"C3"`.
    ///
    /// Only meaningful for coordinates on a board, i.e. non-negative ones.
    pub fn algebraic(&self) -> String {
        format!("{}{}", label::encode(self.x as u64), self.y as i64 + 1)
    }
}

impl From<(i32, i32)> for Coords {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A position on the board, as given by a caller.
///
/// Either an algebraic position like `"C3"` or raw coordinates. Both are
/// validated by [`Board::pos_to_coords()`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Position<'a> {
    Algebraic(&'a str),
    Coords(Coords),
}

impl<'a> From<&'a str> for Position<'a> {
    fn from(pos: &'a str) -> Self {
        Position::Algebraic(pos)
    }
}

impl<'a> From<&'a String> for Position<'a> {
    fn from(pos: &'a String) -> Self {
        Position::Algebraic(pos.as_str())
    }
}

impl From<Coords> for Position<'_> {
    fn from(coords: Coords) -> Self {
        Position::Coords(coords)
    }
}

impl From<(i32, i32)> for Position<'_> {
    fn from(xy: (i32, i32)) -> Self {
        Position::Coords(Coords::from(xy))
    }
}

/// Identifies a [`Board`]. Tokens refer to their board by this id only.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoardId(u64);

impl BoardId {
    fn next() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        BoardId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// The dimensions of a board, as read from a config file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
}

/// A rectangular grid of cells holding tokens, with an undo/redo log of all
/// token mutations.
///
/// The board owns its tokens. They are addressed through the [`TokenId`] that
/// [`Self::add()`] returns, and mutated through [`Self::token_mut()`].
#[derive(Clone, Debug)]
pub struct Board {
    id: BoardId,
    width: i32,
    height: i32,
    /// Token ids by the top-left cell of their footprint.
    ///
    /// Only cells that anchor at least one token have an entry. Tokens at the
    /// same anchor are sorted by id, so undo and redo restore the exact order.
    pub(crate) cells: BTreeMap<Coords, Vec<TokenId>>,
    /// Every token ever added, including removed ones, indexed by [`TokenId`].
    pub(crate) tokens: Vec<Token>,
    history: Vec<HistoryRecord>,
    /// Entries before the cursor can be undone, entries from the cursor on can be redone.
    cursor: usize,
}

/// The observable state of a board, without its history.
///
/// This is what a renderer needs to draw a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: i32,
    pub height: i32,
    /// The non-empty cells of [`Board::cells()`], sorted by coordinates.
    pub cells: Vec<(Coords, Vec<TokenId>)>,
    /// All tokens that are on the grid or were removed from it.
    ///
    /// Tokens whose creation has been undone are left out.
    pub tokens: Vec<(TokenId, Token)>,
}

impl Board {
    /// Creates an empty board. Both dimensions must be at least 2.
    pub fn new(width: i32, height: i32) -> Result<Self, BoardError> {
        if width < 2 || height < 2 {
            return Err(BoardError::InvalidDimensions { width, height });
        }
        Ok(Self {
            id: BoardId::next(),
            width,
            height,
            cells: BTreeMap::new(),
            tokens: Vec::new(),
            history: Vec::new(),
            cursor: 0,
        })
    }

    pub fn from_config(config: &BoardConfig) -> Result<Self, BoardError> {
        Self::new(config.width, config.height)
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The tokens on the grid, by the top-left cell of their footprint.
    pub fn cells(&self) -> &BTreeMap<Coords, Vec<TokenId>> {
        &self.cells
    }

    /// All tokens ever added, including removed ones.
    pub fn tokens(&self) -> impl Iterator<Item = (TokenId, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(idx, token)| (TokenId(idx), token))
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.0)
    }

    /// Returns a handle for mutating the token.
    pub fn token_mut(&mut self, id: TokenId) -> Result<TokenMut<'_>, BoardError> {
        if id.0 >= self.tokens.len() {
            return Err(BoardError::UnknownToken(id));
        }
        Ok(TokenMut::new(self, id))
    }

    pub fn is_in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    /// Resolves a position to coordinates on this board.
    ///
    /// Algebraic positions are trimmed and upper-cased, then must consist of
    /// one or more letters (the column) followed by a 1-based row number
    /// without leading zeros.
    pub fn pos_to_coords<'p>(&self, pos: impl Into<Position<'p>>) -> Result<Coords, BoardError> {
        let coords = match pos.into() {
            Position::Coords(coords) => {
                if !self.is_in_bounds(coords.x as i64, coords.y as i64) {
                    return Err(BoardError::OutOfBounds {
                        x: coords.x as i64,
                        y: coords.y as i64,
                    });
                }
                coords
            }
            Position::Algebraic(pos) => {
                let (x, y) = parse_algebraic(pos)?;
                if !self.is_in_bounds(x, y) {
                    return Err(BoardError::OutOfBounds { x, y });
                }
                // Both fit into i32 since they are smaller than the dimensions
                Coords::new(x as i32, y as i32)
            }
        };
        trace!(x = coords.x, y = coords.y, "Resolved position");
        Ok(coords)
    }

    /// Resolves a position for a token of the given dimension, whose whole
    /// footprint must fit on the board.
    pub(crate) fn resolve_anchor(
        &self,
        pos: Position<'_>,
        dimension: i32,
    ) -> Result<Coords, BoardError> {
        let anchor = self.pos_to_coords(pos)?;
        let far_x = anchor.x as i64 + dimension as i64 - 1;
        let far_y = anchor.y as i64 + dimension as i64 - 1;
        if !self.is_in_bounds(far_x, far_y) {
            return Err(BoardError::OutOfBounds { x: far_x, y: far_y });
        }
        Ok(anchor)
    }

    /// Puts an unowned token on the board.
    ///
    /// This is recorded in the history, and undoing it takes the token off
    /// the grid again. The token stays known to the board under the returned id.
    pub fn add<'p>(
        &mut self,
        pos: impl Into<Position<'p>>,
        mut token: Token,
    ) -> Result<TokenId, BoardError> {
        if token.owner.is_some() {
            return Err(BoardError::DuplicateAttachment);
        }
        if token.dimension() < 1 {
            return Err(BoardError::InvalidTokenDimension(token.dimension()));
        }
        let at = self.resolve_anchor(pos.into(), token.dimension())?;

        let id = TokenId(self.tokens.len());
        token.owner = Some(self.id);
        token.removed = false;
        token.coords = None;
        self.tokens.push(token);
        self.place(id, at);
        debug!(token = %id, pos = %at.algebraic(), "Added token");
        self.record(HistoryRecord::Create { token: id, at });
        Ok(id)
    }

    /// Returns a token whose footprint covers the position.
    ///
    /// Anchor cells are searched in [`Coords`] order, i.e. by column, then by
    /// row. The first anchor holding a covering token wins, and among the
    /// tokens at that anchor the one with the highest id is returned. This is
    /// not necessarily the token placed there most recently.
    pub fn get<'p>(&self, pos: impl Into<Position<'p>>) -> Result<Option<TokenId>, BoardError> {
        let Coords { x, y } = self.pos_to_coords(pos)?;
        let found = self
            .cells
            .values()
            .flat_map(|ids| ids.iter().rev())
            .find(|id| self.tokens[id.0].covers(x, y));
        Ok(found.copied())
    }

    /// Appends a record to the history, discarding everything that could have been redone.
    pub(crate) fn record(&mut self, record: HistoryRecord) {
        self.history.truncate(self.cursor);
        self.history.push(record);
        self.cursor = self.history.len();
    }

    pub fn history(&self) -> &[HistoryRecord] {
        &self.history
    }

    /// The index of the next history entry to redo.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    pub fn undo(&mut self) -> Result<(), BoardError> {
        if !self.can_undo() {
            return Err(BoardError::HistoryExhausted(HistoryEnd::Start));
        }
        self.cursor -= 1;
        let record = self.history[self.cursor].clone();
        debug!(kind = ?record.kind(), token = %record.token(), "Undo");
        record.revert(self);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), BoardError> {
        if !self.can_redo() {
            return Err(BoardError::HistoryExhausted(HistoryEnd::End));
        }
        let record = self.history[self.cursor].clone();
        debug!(kind = ?record.kind(), token = %record.token(), "Redo");
        record.apply(self);
        self.cursor += 1;
        Ok(())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            width: self.width,
            height: self.height,
            cells: self
                .cells
                .iter()
                .map(|(&coords, ids)| (coords, ids.clone()))
                .collect(),
            tokens: self
                .tokens()
                .filter(|(_, token)| token.state() != TokenState::Unplaced)
                .map(|(id, token)| (id, token.clone()))
                .collect(),
        }
    }

    /// Every state the board went through, from the empty board to the
    /// state after the last history entry.
    ///
    /// The frame at index `i` is the state with the first `i` entries
    /// applied. Only recorded entries are replayed, so the frame at
    /// [`Self::cursor()`] equals the current state unless tokens were moved
    /// with [`TokenMut::move_to_unrecorded()`].
    pub fn replay_frames(&self) -> Vec<BoardSnapshot> {
        let mut scratch = self.clone();
        while scratch.undo().is_ok() {}
        let mut frames = Vec::with_capacity(self.history.len() + 1);
        frames.push(scratch.snapshot());
        while scratch.redo().is_ok() {
            frames.push(scratch.snapshot());
        }
        frames
    }

    /// Puts the token on the grid, without any validation or recording.
    pub(crate) fn place(&mut self, id: TokenId, at: Coords) {
        let ids = self.cells.entry(at).or_default();
        if let Err(idx) = ids.binary_search(&id) {
            ids.insert(idx, id);
        }
        self.tokens[id.0].coords = Some(at);
    }

    /// Takes the token off the grid, without any validation or recording.
    pub(crate) fn lift(&mut self, id: TokenId) {
        if let Some(at) = self.tokens[id.0].coords.take() {
            if let Some(ids) = self.cells.get_mut(&at) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.cells.remove(&at);
                }
            }
        }
    }
}

impl Index<TokenId> for Board {
    type Output = Token;

    /// Panics if the token does not belong to this board.
    fn index(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }
}

/// Splits a position like `"C3"` into zero-based `(x, y)`.
///
/// Values too large for an `i64` saturate, which puts them out of bounds.
fn parse_algebraic(pos: &str) -> Result<(i64, i64), BoardError> {
    let normalized = pos.trim().to_ascii_uppercase();
    let malformed = |label_err: Option<LabelError>| BoardError::MalformedPosition {
        position: String::from(pos),
        label_err,
    };

    let digits_start = normalized
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(normalized.len());
    let (letters, digits) = normalized.split_at(digits_start);

    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
        || digits.starts_with('0')
    {
        return Err(malformed(None));
    }
    let x = match label::decode(letters) {
        Ok(idx) => i64::try_from(idx).unwrap_or(i64::MAX),
        Err(LabelError::TooLong) => i64::MAX,
        Err(err) => return Err(malformed(Some(err))),
    };
    let y = digits.parse::<i64>().map(|row| row - 1).unwrap_or(i64::MAX);
    Ok((x, y))
}
