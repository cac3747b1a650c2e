//! Report document generation
//!
//! Emits the full `.tex` source for a collection tree. Directory nesting maps
//! to `\section`, `\subsection` and `\subsubsection`; papers get a
//! `\paragraph` heading, a byline and one table per note type.

use indexmap::IndexMap;

use super::table::TableBudget;
use super::{escape, RenderError};
use crate::collection::CollectionNode;
use crate::metadata::{PaperDate, PaperRecord};
use crate::notes::{NoteBucket, NoteEntry};

const SECTION_COMMANDS: [&str; 3] = ["section", "subsection", "subsubsection"];

const PREAMBLE: &str = "\\documentclass[a4paper]{article}\n\
\n\
\\usepackage{booktabs}\n\
\\usepackage{geometry}\n\
\\usepackage[colorlinks=true, linkcolor=red, urlcolor=blue, citecolor=blue, anchorcolor=black]{hyperref}\n\
\n\
% redefining parameters\n\
\\geometry{a4paper, left=0.15\\paperwidth, right=0.15\\paperwidth, top=0.12\\paperheight, bottom=0.18\\paperheight}\n\
\\setcounter{tocdepth}{4}\n\
\n\
% defining new commands\n\
\\newcommand{\\contents}{\\tableofcontents\\newpage}\n\
\n\
\\begin{document}\n\
\\contents\n";

/// Render a collection tree with the default table budget.
pub fn render_report(
    collection: &IndexMap<String, CollectionNode>,
) -> Result<String, RenderError> {
    ReportRenderer::default().render(collection)
}

/// Configurable report renderer.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    budget: TableBudget,
}

impl ReportRenderer {
    pub fn new(budget: TableBudget) -> Self {
        Self { budget }
    }

    pub fn render(
        &self,
        collection: &IndexMap<String, CollectionNode>,
    ) -> Result<String, RenderError> {
        let mut out = String::from(PREAMBLE);
        self.render_children(&mut out, collection, 0)?;
        out.push_str("\n\\end{document}\n");
        Ok(out)
    }

    fn render_children(
        &self,
        out: &mut String,
        children: &IndexMap<String, CollectionNode>,
        level: usize,
    ) -> Result<(), RenderError> {
        for (name, node) in children {
            match node {
                CollectionNode::Directory(subtree) => {
                    if level >= SECTION_COMMANDS.len() {
                        return Err(RenderError::TooDeeplyNested {
                            directory: name.clone(),
                        });
                    }
                    out.push_str(&format!(
                        "\n\\{}{{{}}}\n",
                        SECTION_COMMANDS[level],
                        escape(name)
                    ));
                    self.render_children(out, subtree, level + 1)?;
                }
                CollectionNode::Paper(record) => {
                    out.push_str(&format!("\n\\paragraph{{{}}}\n", escape(name)));
                    self.render_paper(out, record)?;
                }
            }
        }
        Ok(())
    }

    fn render_paper(&self, out: &mut String, record: &PaperRecord) -> Result<(), RenderError> {
        out.push_str(&format!("\\textbf{{{}}}\\\\\n", escape(&record.author)));
        let date_line = match &record.date {
            PaperDate::MonthYear(month, year) => format!("{month:02}-{year}"),
            PaperDate::Missing(_) => "date missing".to_string(),
        };
        out.push_str(&format!("{date_line}\\\\\n"));
        out.push_str(&format!(
            "\\href{{https://doi.org/{}}}{{{}}}\n",
            escape(&record.doi),
            escape(&record.doi)
        ));

        for (kind, bucket) in &record.notes {
            self.render_table(out, kind, bucket)?;
        }
        Ok(())
    }

    fn render_table(
        &self,
        out: &mut String,
        kind: &str,
        bucket: &NoteBucket,
    ) -> Result<(), RenderError> {
        out.push_str("\n\\begin{table}[h!]\n");
        out.push_str(&format!("\\caption{{{}}}\n", escape(kind)));

        match bucket {
            NoteBucket::Entries(entries) => {
                let rows: Vec<Vec<String>> = entries.iter().flat_map(entry_rows).collect();
                let widths = self.budget.column_widths(&rows, 2, &["Page", "Note"])?;

                out.push_str("\\begin{tabular}{ll}\n\\toprule\nPage & Note\\\\\n\\midrule\n");
                for row in &rows {
                    for sub_row in TableBudget::wrap_row(&widths, row)? {
                        out.push_str(&format!(
                            "{} & {}\\\\\n",
                            escape(&sub_row[0]),
                            escape(&sub_row[1])
                        ));
                    }
                }
            }
            NoteBucket::Categories(categories) => {
                let rows: Vec<Vec<String>> = categories
                    .values()
                    .flatten()
                    .flat_map(entry_rows)
                    .collect();
                let widths = self.budget.column_widths(&rows, 2, &["Page", "Note"])?;

                out.push_str(
                    "\\begin{tabular}{lll}\n\\toprule\nSubcategory & Page & Note\\\\\n\\midrule\n",
                );
                for (category, entries) in categories {
                    let mut label = Some(escape(category));
                    for entry in entries {
                        match entry {
                            NoteEntry::Note(page, text) => {
                                let row = vec![page.to_string(), text.clone()];
                                for sub_row in TableBudget::wrap_row(&widths, &row)? {
                                    out.push_str(&format!(
                                        "{} & {} & {}\\\\\n",
                                        label.take().unwrap_or_default(),
                                        escape(&sub_row[0]),
                                        escape(&sub_row[1])
                                    ));
                                }
                            }
                            NoteEntry::Answered(q_page, q_text, a_page, a_text) => {
                                let question = vec![q_page.to_string(), q_text.clone()];
                                for sub_row in TableBudget::wrap_row(&widths, &question)? {
                                    let note = if sub_row[1].is_empty() {
                                        String::new()
                                    } else {
                                        format!("\\textit{{{}}}", escape(&sub_row[1]))
                                    };
                                    out.push_str(&format!(
                                        "{} & {} & {}\\\\\n",
                                        label.take().unwrap_or_default(),
                                        escape(&sub_row[0]),
                                        note
                                    ));
                                }
                                let answer = vec![a_page.to_string(), a_text.clone()];
                                for sub_row in TableBudget::wrap_row(&widths, &answer)? {
                                    out.push_str(&format!(
                                        " & {} & {}\\\\\n",
                                        escape(&sub_row[0]),
                                        escape(&sub_row[1])
                                    ));
                                }
                            }
                        }
                    }
                }
            }
        }

        out.push_str("\\bottomrule\n\\end{tabular}\n\\end{table}\n");
        Ok(())
    }
}

fn entry_rows(entry: &NoteEntry) -> Vec<Vec<String>> {
    match entry {
        NoteEntry::Note(page, text) => vec![vec![page.to_string(), text.clone()]],
        NoteEntry::Answered(q_page, q_text, a_page, a_text) => vec![
            vec![q_page.to_string(), q_text.clone()],
            vec![a_page.to_string(), a_text.clone()],
        ],
    }
}
