use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use tabletop::BoardConfig;

pub const DEFAULT_CONFIG: BoardConfig = BoardConfig {
    width: 8,
    height: 8,
};

/// Reads a board config like `{"width": 8, "height": 8}` from a JSON file.
pub fn load_board_config(path: &Path) -> anyhow::Result<BoardConfig> {
    let file = File::open(path)
        .with_context(|| format!("Could not open board config '{}'", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid board config '{}'", path.display()))?;
    Ok(config)
}

/// Starts from the config file, if any, and applies the overrides given on the command line.
pub fn resolve_board_config(
    path: Option<&Path>,
    width: Option<i32>,
    height: Option<i32>,
) -> anyhow::Result<BoardConfig> {
    let mut config = match path {
        Some(path) => load_board_config(path)?,
        None => DEFAULT_CONFIG,
    };
    if let Some(width) = width {
        config.width = width;
    }
    if let Some(height) = height {
        config.height = height;
    }
    Ok(config)
}
