use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroU8;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tabletop::{Board, BoardError, Coords, Direction, PropertyValue, Token, TokenId};
use tracing::debug;

/// A position in a script, either `"C3"` or `[2, 2]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptPosition {
    Algebraic(String),
    Coords(i32, i32),
}

/// One step of a script.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScriptStep {
    /// Puts a new token on the board. Tokens are numbered in the order they are added.
    Add {
        pos: ScriptPosition,
        #[serde(default)]
        label: Option<String>,
        #[serde(default = "default_dimension")]
        dimension: NonZeroU8,
        #[serde(default)]
        properties: BTreeMap<String, PropertyValue>,
    },
    Move {
        token: TokenId,
        to: ScriptPosition,
    },
    Step {
        token: TokenId,
        direction: Direction,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    Hide {
        token: TokenId,
    },
    Unhide {
        token: TokenId,
    },
    Remove {
        token: TokenId,
    },
    Set {
        token: TokenId,
        key: String,
        value: PropertyValue,
    },
    Undo,
    Redo,
}

fn default_dimension() -> NonZeroU8 {
    NonZeroU8::MIN
}

fn default_steps() -> u32 {
    1
}

/// Reads a script, i.e. a JSON array of steps.
pub fn load_script(path: &Path) -> anyhow::Result<Vec<ScriptStep>> {
    let file =
        File::open(path).with_context(|| format!("Could not open script '{}'", path.display()))?;
    let steps = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid script '{}'", path.display()))?;
    Ok(steps)
}

impl ScriptStep {
    /// Performs this step on the board.
    ///
    /// A step that fails leaves the board as it was.
    pub fn run(&self, board: &mut Board) -> Result<(), BoardError> {
        match self {
            ScriptStep::Add {
                pos,
                label,
                dimension,
                properties,
            } => {
                let mut token = Token::new().with_dimension(dimension.get() as i32);
                if let Some(label) = label {
                    token = token.with_label(label.as_str());
                }
                for (key, value) in properties {
                    token = token.with_property(key.as_str(), value.clone());
                }
                let id = match pos {
                    ScriptPosition::Algebraic(pos) => board.add(pos, token)?,
                    ScriptPosition::Coords(x, y) => board.add(Coords::new(*x, *y), token)?,
                };
                debug!(token = %id, "Token added by script");
            }
            ScriptStep::Move { token, to } => {
                let mut token = board.token_mut(*token)?;
                match to {
                    ScriptPosition::Algebraic(pos) => token.move_to(pos)?,
                    ScriptPosition::Coords(x, y) => token.move_to((*x, *y))?,
                }
            }
            ScriptStep::Step {
                token,
                direction,
                steps,
            } => board.token_mut(*token)?.step(*direction, *steps)?,
            ScriptStep::Hide { token } => board.token_mut(*token)?.hide()?,
            ScriptStep::Unhide { token } => board.token_mut(*token)?.unhide()?,
            ScriptStep::Remove { token } => board.token_mut(*token)?.remove()?,
            ScriptStep::Set { token, key, value } => board
                .token_mut(*token)?
                .set_property(key.as_str(), value.clone())?,
            ScriptStep::Undo => board.undo()?,
            ScriptStep::Redo => board.redo()?,
        }
        Ok(())
    }
}
