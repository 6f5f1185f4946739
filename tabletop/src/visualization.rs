use crate::{label, BoardSnapshot, Token};

const EMPTY_CELL: char = '·';
const UNLABELED_TOKEN: char = '●';

/// Draws the board as a box of cells, with column labels above and row
/// numbers to the left.
///
/// A token is drawn as the first character of its label (or `●`) on every
/// cell of its footprint. Hidden tokens are only drawn if `show_hidden` is set.
/// Where tokens share an anchor, the one added last is drawn.
pub fn render(snapshot: &BoardSnapshot, show_hidden: bool) -> String {
    let (width, height) = (snapshot.width, snapshot.height);
    let columns = width as usize;
    let mut grid = vec![EMPTY_CELL; columns * height as usize];
    for (_, ids) in &snapshot.cells {
        for id in ids {
            let Some(token) = snapshot
                .tokens
                .iter()
                .find(|(other, _)| other == id)
                .map(|(_, token)| token)
            else {
                continue;
            };
            if token.is_hidden() && !show_hidden {
                continue;
            }
            let Some(anchor) = token.coords() else {
                continue;
            };
            let dim = token.dimension();
            for y in anchor.y..(anchor.y + dim).min(height) {
                for x in anchor.x..(anchor.x + dim).min(width) {
                    grid[cell_index(columns, x, y)] = token_char(token);
                }
            }
        }
    }

    // The last column has the longest label
    let cell_width = label::encode((width - 1) as u64).len() + 1;
    let row_width = height.to_string().len();

    let mut result = format!("{:row_width$}  ", "");
    for column in label::labels().take(columns) {
        result += &format!("{:>cell_width$}", column);
    }
    result += &format!("\n{:row_width$} ╭", "");
    result += &"─".repeat(cell_width * columns + 1);
    result += "╮\n";
    for y in 0..height {
        result += &format!("{:>row_width$} │", y + 1);
        for x in 0..width {
            result += &format!("{:>cell_width$}", grid[cell_index(columns, x, y)]);
        }
        result += " │\n";
    }
    result += &format!("{:row_width$} ╰", "");
    result += &"─".repeat(cell_width * columns + 1);
    result += "╯";
    result
}

/// Index of the cell `(x, y)` in a row-major grid with `columns` columns.
fn cell_index(columns: usize, x: i32, y: i32) -> usize {
    y as usize * columns + x as usize
}

fn token_char(token: &Token) -> char {
    token
        .label()
        .and_then(|label| label.chars().next())
        .unwrap_or(UNLABELED_TOKEN)
}
