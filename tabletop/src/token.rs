use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::{Board, BoardError, BoardId, Coords, Direction, HistoryRecord, Position};

/// Refers to a token on a [`Board`]. Ids are handed out in the order tokens are added.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(pub usize);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A value in the property bag of a [`Token`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Str(String::from(value))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Str(value)
    }
}

/// Where a token is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenState {
    /// Not on any grid: either never added, or its creation was undone.
    Unplaced,
    Placed,
    Hidden,
    /// Taken off the grid. Only undoing the removal brings it back.
    Removed,
}

/// A placeable entity, possibly covering several cells.
///
/// A token is built unattached and then handed to [`Board::add()`], after
/// which it belongs to that board for good.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Token {
    #[serde(skip)]
    pub(crate) owner: Option<BoardId>,
    pub(crate) coords: Option<Coords>,
    #[serde(deserialize_with = "positive_dimension")]
    dimension: i32,
    label: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) removed: bool,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
}

fn positive_dimension<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let dimension = i32::deserialize(deserializer)?;
    if dimension < 1 {
        return Err(serde::de::Error::custom(format!(
            "token dimension must be positive, got {}",
            dimension
        )));
    }
    Ok(dimension)
}

impl Default for Token {
    fn default() -> Self {
        Self::new()
    }
}

impl Token {
    /// A visible token covering a single cell, without label or properties.
    pub fn new() -> Self {
        Self {
            owner: None,
            coords: None,
            dimension: 1,
            label: None,
            hidden: false,
            removed: false,
            properties: BTreeMap::new(),
        }
    }

    /// Makes the token cover `dimension` x `dimension` cells.
    ///
    /// Panics if `dimension` is smaller than 1.
    pub fn with_dimension(mut self, dimension: i32) -> Self {
        assert!(dimension >= 1, "token dimension must be positive");
        self.dimension = dimension;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// The board this token was added to, if any.
    pub fn owner(&self) -> Option<BoardId> {
        self.owner
    }

    /// The top-left cell of the token, or `None` when it is not on the grid.
    pub fn coords(&self) -> Option<Coords> {
        self.coords
    }

    /// The algebraic position of the top-left cell, e.g. `"C3"`.
    pub fn pos(&self) -> Option<String> {
        self.coords.map(|coords| coords.algebraic())
    }

    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn state(&self) -> TokenState {
        match (self.coords, self.removed, self.hidden) {
            (_, true, _) => TokenState::Removed,
            (None, false, _) => TokenState::Unplaced,
            (Some(_), false, true) => TokenState::Hidden,
            (Some(_), false, false) => TokenState::Placed,
        }
    }

    /// Whether the cell `(x, y)` is covered by this token.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        match self.coords {
            Some(Coords { x: ax, y: ay }) => {
                x >= ax && x < ax + self.dimension && y >= ay && y < ay + self.dimension
            }
            None => false,
        }
    }
}

/// A token together with the board it lives on, for mutating it.
///
/// Every mutation is checked before anything is changed, and is recorded
/// in the board's history unless stated otherwise. Mutating a token that is
/// not on the grid fails with [`BoardError::TokenDetached`].
pub struct TokenMut<'a> {
    board: &'a mut Board,
    id: TokenId,
}

impl<'a> TokenMut<'a> {
    pub(crate) fn new(board: &'a mut Board, id: TokenId) -> Self {
        Self { board, id }
    }

    pub fn id(&self) -> TokenId {
        self.id
    }

    pub fn token(&self) -> &Token {
        &self.board.tokens[self.id.0]
    }

    /// Like [`Token::pos()`], but fails if the token is not on the grid.
    pub fn pos(&self) -> Result<String, BoardError> {
        self.token().pos().ok_or(BoardError::TokenDetached(self.id))
    }

    fn placed_coords(&self) -> Result<Coords, BoardError> {
        self.token()
            .coords
            .ok_or(BoardError::TokenDetached(self.id))
    }

    /// Moves the token so that its top-left cell is at `target`.
    pub fn move_to<'p>(&mut self, target: impl Into<Position<'p>>) -> Result<(), BoardError> {
        self.relocate(target.into(), true)
    }

    /// Like [`Self::move_to()`], but leaves the history alone.
    pub fn move_to_unrecorded<'p>(
        &mut self,
        target: impl Into<Position<'p>>,
    ) -> Result<(), BoardError> {
        self.relocate(target.into(), false)
    }

    fn relocate(&mut self, target: Position<'_>, record: bool) -> Result<(), BoardError> {
        let from = self.placed_coords()?;
        let to = self.board.resolve_anchor(target, self.token().dimension())?;

        self.board.lift(self.id);
        self.board.place(self.id, to);
        debug!(token = %self.id, from = %from.algebraic(), to = %to.algebraic(), record, "Moved token");
        if record {
            self.board.record(HistoryRecord::Move {
                token: self.id,
                from,
                to,
            });
        }
        Ok(())
    }

    /// Moves the token `steps` cells into `direction`.
    ///
    /// Instead of leaving the board, the token stops at its edge.
    pub fn step(&mut self, direction: Direction, steps: u32) -> Result<(), BoardError> {
        let from = self.placed_coords()?;
        let (dx, dy) = direction.delta();
        let dimension = self.token().dimension();
        // The footprint fits, so these maxima are non-negative
        let max_x = (self.board.width() - dimension) as i64;
        let max_y = (self.board.height() - dimension) as i64;
        let x = (from.x as i64 + dx as i64 * steps as i64).clamp(0, max_x);
        let y = (from.y as i64 + dy as i64 * steps as i64).clamp(0, max_y);
        self.relocate(Position::Coords(Coords::new(x as i32, y as i32)), true)
    }

    /// Hides the token. Hiding a hidden token is allowed, and still recorded.
    pub fn hide(&mut self) -> Result<(), BoardError> {
        self.set_hidden(true)
    }

    /// Reveals the token. Revealing a visible token is allowed, and still recorded.
    pub fn unhide(&mut self) -> Result<(), BoardError> {
        self.set_hidden(false)
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), BoardError> {
        self.placed_coords()?;
        let token = &mut self.board.tokens[self.id.0];
        let was_hidden = std::mem::replace(&mut token.hidden, hidden);
        debug!(token = %self.id, hidden, "Changed visibility");
        let record = if hidden {
            HistoryRecord::Hide {
                token: self.id,
                was_hidden,
            }
        } else {
            HistoryRecord::Unhide {
                token: self.id,
                was_hidden,
            }
        };
        self.board.record(record);
        Ok(())
    }

    /// Takes the token off the grid. It stays known to the board, so that
    /// the removal can be undone.
    pub fn remove(&mut self) -> Result<(), BoardError> {
        let at = self.placed_coords()?;
        self.board.lift(self.id);
        self.board.tokens[self.id.0].removed = true;
        debug!(token = %self.id, pos = %at.algebraic(), "Removed token");
        self.board.record(HistoryRecord::Remove { token: self.id, at });
        Ok(())
    }

    /// Sets a property, remembering the previous value (or its absence) for undo.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> Result<(), BoardError> {
        self.placed_coords()?;
        let key = key.into();
        let new = value.into();
        let old = self.board.tokens[self.id.0]
            .properties
            .insert(key.clone(), new.clone());
        debug!(token = %self.id, key = %key, "Updated property");
        self.board.record(HistoryRecord::Update {
            token: self.id,
            key,
            old,
            new,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::quickcheck;

    use super::*;
    use crate::arbitrary::StepInput;

    quickcheck! {
        fn stepping_never_leaves_the_board(input: StepInput) -> bool {
            let mut board = Board::new(input.width, input.height).unwrap();
            let token = Token::new().with_dimension(input.dimension);
            let id = board.add(input.start, token).unwrap();
            let result = board.token_mut(id).unwrap().step(input.direction, input.steps);
            let Some(Coords { x, y }) = board[id].coords() else {
                return false;
            };
            result.is_ok()
                && x >= 0
                && y >= 0
                && x + input.dimension <= input.width
                && y + input.dimension <= input.height
        }
    }

    #[test]
    fn builder() {
        let token = Token::new()
            .with_label("Goblin")
            .with_dimension(2)
            .with_property("hp", 7)
            .with_property("name", "Grik");
        assert_eq!(token.label(), Some("Goblin"));
        assert_eq!(token.dimension(), 2);
        assert_eq!(token.property("hp"), Some(&PropertyValue::Int(7)));
        assert_eq!(token.state(), TokenState::Unplaced);
        assert_eq!(token.owner(), None);
        assert_eq!(token.pos(), None);
    }

    #[test]
    #[should_panic]
    fn zero_dimension_panics() {
        let _ = Token::new().with_dimension(0);
    }

    #[test]
    fn state_machine() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board.add("A1", Token::new()).unwrap();
        assert_eq!(board[id].state(), TokenState::Placed);
        assert_eq!(board[id].owner(), Some(board.id()));

        let mut token = board.token_mut(id).unwrap();
        token.hide().unwrap();
        assert_eq!(token.token().state(), TokenState::Hidden);
        token.move_to("B2").unwrap();
        assert_eq!(token.token().state(), TokenState::Hidden);
        token.unhide().unwrap();
        assert_eq!(token.token().state(), TokenState::Placed);
        token.remove().unwrap();
        assert_eq!(token.token().state(), TokenState::Removed);
        assert_eq!(token.pos(), Err(BoardError::TokenDetached(id)));
        assert_eq!(token.step(Direction::R, 1), Err(BoardError::TokenDetached(id)));
        assert_eq!(token.set_property("hp", 1), Err(BoardError::TokenDetached(id)));
        assert_eq!(token.remove(), Err(BoardError::TokenDetached(id)));
        assert_eq!(board.history().len(), 5);
    }

    #[test]
    fn removing_hidden_token_and_undoing() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board.add("D5", Token::new()).unwrap();
        board.token_mut(id).unwrap().hide().unwrap();
        board.token_mut(id).unwrap().remove().unwrap();
        board.undo().unwrap();
        assert_eq!(board[id].state(), TokenState::Hidden);
        assert_eq!(board[id].pos().as_deref(), Some("D5"));
    }

    #[test]
    fn repeated_hide_is_recorded_and_undone_exactly() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board.add("A1", Token::new()).unwrap();
        board.token_mut(id).unwrap().hide().unwrap();
        board.token_mut(id).unwrap().hide().unwrap();
        assert_eq!(board.history().len(), 3);
        board.undo().unwrap();
        assert!(board[id].is_hidden());
        board.undo().unwrap();
        assert!(!board[id].is_hidden());
    }

    #[test]
    fn property_updates() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board
            .add("A1", Token::new().with_property("hp", 10))
            .unwrap();
        board.token_mut(id).unwrap().set_property("hp", 4).unwrap();
        board.token_mut(id).unwrap().set_property("poisoned", true).unwrap();
        assert_eq!(board[id].property("hp"), Some(&PropertyValue::Int(4)));

        board.undo().unwrap();
        assert_eq!(board[id].property("poisoned"), None);
        board.undo().unwrap();
        assert_eq!(board[id].property("hp"), Some(&PropertyValue::Int(10)));
        board.redo().unwrap();
        assert_eq!(board[id].property("hp"), Some(&PropertyValue::Int(4)));
    }

    #[test]
    fn unrecorded_move() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board.add("A1", Token::new()).unwrap();
        board.token_mut(id).unwrap().move_to_unrecorded("H8").unwrap();
        assert_eq!(board[id].pos().as_deref(), Some("H8"));
        assert_eq!(board.history().len(), 1);
        assert_eq!(board.get("H8"), Ok(Some(id)));
    }

    #[test]
    fn failed_move_changes_nothing() {
        let mut board = Board::new(8, 8).unwrap();
        let id = board.add("A1", Token::new()).unwrap();
        let before = board.snapshot();
        let mut token = board.token_mut(id).unwrap();
        assert!(token.move_to("Z1").is_err());
        assert!(token.move_to("A1B").is_err());
        assert!(token.move_to((3, -1)).is_err());
        assert_eq!(board.snapshot(), before);
        assert_eq!(board.history().len(), 1);
    }

    #[test]
    fn properties_serialize_untagged() {
        let token = Token::new()
            .with_label("Knight")
            .with_property("hp", 3)
            .with_property("speed", 1.5)
            .with_property("mounted", false);
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["properties"]["hp"], serde_json::json!(3));
        assert_eq!(json["properties"]["speed"], serde_json::json!(1.5));
        assert_eq!(json["properties"]["mounted"], serde_json::json!(false));
        let back: Token = serde_json::from_value(json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn non_positive_dimensions_are_rejected() {
        for dimension in [0, -3] {
            let mut json = serde_json::to_value(Token::new()).unwrap();
            json["dimension"] = serde_json::json!(dimension);
            assert!(serde_json::from_value::<Token>(json).is_err());
        }

        // Tokens that got around the checks are still refused by the board
        let mut board = Board::new(8, 8).unwrap();
        let mut token = Token::new();
        token.dimension = 0;
        assert_eq!(board.add("D4", token), Err(BoardError::InvalidTokenDimension(0)));
        assert!(board.cells().is_empty());
        assert!(board.history().is_empty());
    }
}
