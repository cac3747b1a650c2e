//! Character-budget table layout
//!
//! Table cells are wrapped to per-column character widths so the generated
//! tabulars stay within the page. Widths derive from the cell contents: each
//! column asks for its widest cell, explicitly capped columns are clamped,
//! and the remaining budget is handed out to the open columns narrowest
//! first, so short columns (page numbers) never starve. Wrapping splits on
//! word boundaries only; a word wider than its column is a hard error.

use std::collections::BTreeMap;

use super::RenderError;

/// Width budget of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBudget {
    /// Total character budget across all columns.
    pub max_characters: usize,
    /// Optional hard caps per column index.
    pub column_caps: BTreeMap<usize, usize>,
}

impl Default for TableBudget {
    fn default() -> Self {
        Self {
            max_characters: 80,
            column_caps: BTreeMap::new(),
        }
    }
}

impl TableBudget {
    pub fn new(max_characters: usize) -> Self {
        Self {
            max_characters,
            ..Default::default()
        }
    }

    /// Reject caps that cannot fit the table budget.
    pub fn validate(&self) -> Result<(), RenderError> {
        let configured: usize = self.column_caps.values().sum();
        if configured > self.max_characters {
            return Err(RenderError::ColumnBudget {
                configured,
                budget: self.max_characters,
            });
        }
        Ok(())
    }

    /// Compute the width of each of `n_cols` columns for `rows`, grown to
    /// fit the `header` labels.
    pub fn column_widths(
        &self,
        rows: &[Vec<String>],
        n_cols: usize,
        header: &[&str],
    ) -> Result<Vec<usize>, RenderError> {
        self.validate()?;

        let natural: Vec<usize> = (0..n_cols)
            .map(|col| {
                rows.iter()
                    .map(|row| row.get(col).map(|cell| char_width(cell)).unwrap_or(0))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut widths = vec![0usize; n_cols];
        let mut open: Vec<usize> = Vec::new();
        let mut used = 0;
        for (col, &want) in natural.iter().enumerate() {
            if let Some(&cap) = self.column_caps.get(&col) {
                widths[col] = want.min(cap);
                used += widths[col];
            } else {
                open.push(col);
            }
        }

        // narrowest columns first, so they take only what they need and the
        // leftovers go to the wide text columns
        open.sort_by_key(|&col| natural[col]);
        let mut remaining = self.max_characters.saturating_sub(used);
        let mut left = open.len();
        for col in open {
            let share = remaining / left;
            widths[col] = natural[col].min(share);
            remaining -= widths[col];
            left -= 1;
        }

        for (col, label) in header.iter().enumerate().take(n_cols) {
            widths[col] = widths[col].max(char_width(label));
        }
        Ok(widths)
    }

    /// Wrap one logical row into sub-rows fitting `widths`.
    pub fn wrap_row(widths: &[usize], row: &[String]) -> Result<Vec<Vec<String>>, RenderError> {
        let cells: Vec<Vec<String>> = widths
            .iter()
            .zip(row)
            .map(|(&width, cell)| wrap_cell(cell, width))
            .collect::<Result<_, _>>()?;

        let height = cells.iter().map(Vec::len).max().unwrap_or(1);
        let sub_rows = (0..height)
            .map(|line| {
                cells
                    .iter()
                    .map(|lines| lines.get(line).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Ok(sub_rows)
    }
}

// column widths are in characters, not bytes, so umlauts count as one
fn char_width(text: &str) -> usize {
    text.chars().count()
}

fn wrap_cell(text: &str, width: usize) -> Result<Vec<String>, RenderError> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|word| !word.is_empty()) {
        if char_width(word) > width {
            return Err(RenderError::ColumnOverflow {
                word: word.to_string(),
                width,
            });
        }
        if current.is_empty() {
            current.push_str(word);
        } else if char_width(&current) + 1 + char_width(word) <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}
