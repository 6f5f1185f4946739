use serde::{Deserialize, Serialize};

use crate::{Board, Coords, PropertyValue, TokenId};

/// The kind of a [`HistoryRecord`], without its data.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Move,
    Hide,
    Unhide,
    Remove,
    Update,
}

/// One reversible token mutation.
///
/// A record holds exactly what is needed to replay the mutation in either
/// direction, so neither [`Self::apply()`] nor [`Self::revert()`] validates
/// anything. Records are only ever appended to a board's history, never changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum HistoryRecord {
    Create {
        token: TokenId,
        at: Coords,
    },
    Move {
        token: TokenId,
        from: Coords,
        to: Coords,
    },
    Hide {
        token: TokenId,
        was_hidden: bool,
    },
    Unhide {
        token: TokenId,
        was_hidden: bool,
    },
    Remove {
        token: TokenId,
        at: Coords,
    },
    Update {
        token: TokenId,
        key: String,
        /// `None` if the property did not exist before.
        old: Option<PropertyValue>,
        new: PropertyValue,
    },
}

impl HistoryRecord {
    pub fn kind(&self) -> ActionKind {
        match self {
            HistoryRecord::Create { .. } => ActionKind::Create,
            HistoryRecord::Move { .. } => ActionKind::Move,
            HistoryRecord::Hide { .. } => ActionKind::Hide,
            HistoryRecord::Unhide { .. } => ActionKind::Unhide,
            HistoryRecord::Remove { .. } => ActionKind::Remove,
            HistoryRecord::Update { .. } => ActionKind::Update,
        }
    }

    pub fn token(&self) -> TokenId {
        match *self {
            HistoryRecord::Create { token, .. }
            | HistoryRecord::Move { token, .. }
            | HistoryRecord::Hide { token, .. }
            | HistoryRecord::Unhide { token, .. }
            | HistoryRecord::Remove { token, .. }
            | HistoryRecord::Update { token, .. } => token,
        }
    }

    /// Performs the mutation again. Used when redoing.
    pub(crate) fn apply(&self, board: &mut Board) {
        match self {
            HistoryRecord::Create { token, at } => board.place(*token, *at),
            HistoryRecord::Move { token, to, .. } => {
                board.lift(*token);
                board.place(*token, *to);
            }
            HistoryRecord::Hide { token, .. } => board.tokens[token.0].hidden = true,
            HistoryRecord::Unhide { token, .. } => board.tokens[token.0].hidden = false,
            HistoryRecord::Remove { token, .. } => {
                board.lift(*token);
                board.tokens[token.0].removed = true;
            }
            HistoryRecord::Update {
                token, key, new, ..
            } => {
                board.tokens[token.0]
                    .properties
                    .insert(key.clone(), new.clone());
            }
        }
    }

    /// Takes the mutation back. Used when undoing.
    pub(crate) fn revert(&self, board: &mut Board) {
        match self {
            HistoryRecord::Create { token, .. } => board.lift(*token),
            HistoryRecord::Move { token, from, .. } => {
                board.lift(*token);
                board.place(*token, *from);
            }
            HistoryRecord::Hide { token, was_hidden }
            | HistoryRecord::Unhide { token, was_hidden } => {
                board.tokens[token.0].hidden = *was_hidden
            }
            HistoryRecord::Remove { token, at } => {
                board.tokens[token.0].removed = false;
                board.place(*token, *at);
            }
            HistoryRecord::Update {
                token, key, old, ..
            } => {
                let properties = &mut board.tokens[token.0].properties;
                match old {
                    Some(value) => properties.insert(key.clone(), value.clone()),
                    None => properties.remove(key),
                };
            }
        }
    }
}
