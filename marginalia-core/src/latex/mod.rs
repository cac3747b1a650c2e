//! LaTeX report generation
//!
//! Renders the collection tree as plain LaTeX source: directory nodes become
//! nested sections, paper nodes a paragraph heading with a byline and one
//! booktabs table per note type. No LaTeX toolchain is invoked; the output is
//! a `.tex` file the user compiles themselves.

pub mod report;
pub mod table;

pub use report::{render_report, ReportRenderer};
pub use table::TableBudget;

use thiserror::Error;

/// Errors of the rendering stage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// Directory nesting deeper than the three supported section levels.
    #[error("directory '{directory}' sits on the fourth nesting level; only 3 levels of directories are supported")]
    TooDeeplyNested { directory: String },

    /// A single word wider than its table column.
    #[error("word '{word}' is longer than the maximum allowed column width {width}")]
    ColumnOverflow { word: String, width: usize },

    /// Configured per-column widths that cannot fit the table budget.
    #[error("the configured column widths sum to {configured}, exceeding the table budget of {budget} characters")]
    ColumnBudget { configured: usize, budget: usize },
}

/// Escape LaTeX special characters in free text.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\textasciicircum{}"),
            '\\' => escaped.push_str("\\textbackslash{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}
