use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use marginalia::collect::{collect_notes, CollectOptions};
use marginalia::collection::CollectionNode;
use marginalia::latex::render_report;
use marginalia::paper::OpenPdf;
use marginalia::subjects::{SubjectKind, SubjectTable};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "marginalia",
    about = "Collects PDF annotations from a literature tree and renders them as a LaTeX report",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the literature tree, collect notes and update the missing ledger
    Collect {
        /// Root directory holding the literature tree and the JSON files
        root: PathBuf,

        #[command(flatten)]
        collect: CollectArgs,
    },

    /// Render a previously written collection dump as a LaTeX report
    Render {
        /// Root directory the file paths resolve against
        root: PathBuf,

        /// Collection dump to render
        #[arg(short, long, default_value = "collected_notes.json")]
        collection: PathBuf,

        /// Output .tex file
        #[arg(short, long, default_value = "collected.tex")]
        output: PathBuf,
    },

    /// Collect and render in one invocation
    Run {
        /// Root directory holding the literature tree and the JSON files
        root: PathBuf,

        #[command(flatten)]
        collect: CollectArgs,

        /// Output .tex file
        #[arg(short, long, default_value = "collected.tex")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct CollectArgs {
    /// Literature subdirectory under the root
    #[arg(long, default_value = "literature")]
    literature: String,

    /// JSON file with per-paper field overrides
    #[arg(long)]
    overwrite: Option<PathBuf>,

    /// Missing-fields ledger file
    #[arg(long, default_value = "missing.json")]
    missing: PathBuf,

    /// Also write the collected tree as JSON
    #[arg(long)]
    collection: Option<PathBuf>,

    /// Empty-notes report file
    #[arg(long, default_value = "empty.json")]
    empty: PathBuf,

    /// Keep papers without notes in the tree and skip the empty report
    #[arg(long)]
    keep_empty: bool,

    /// JSON file extending the annotation subject table
    #[arg(long)]
    subjects: Option<PathBuf>,
}

impl CollectArgs {
    fn options(&self) -> CollectOptions {
        CollectOptions {
            literature_dir: self.literature.clone(),
            overwrite_file: self.overwrite.clone(),
            missing_file: self.missing.clone(),
            collection_file: self.collection.clone(),
            empty_file: if self.keep_empty {
                None
            } else {
                Some(self.empty.clone())
            },
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marginalia=info,marginalia_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect { root, collect } => {
            let subjects = subject_table(&root, collect.subjects.as_deref())?;
            collect_notes(&root, &OpenPdf, &subjects, &collect.options())
                .context("collecting notes failed")?;
        }

        Commands::Render {
            root,
            collection,
            output,
        } => {
            let path = resolve(&root, &collection);
            let file = File::open(&path)
                .with_context(|| format!("cannot open collection dump '{}'", path.display()))?;
            let tree: IndexMap<String, CollectionNode> =
                serde_json::from_reader(BufReader::new(file))
                    .context("collection dump is not valid JSON")?;
            write_report(&root, &output, &tree)?;
        }

        Commands::Run {
            root,
            collect,
            output,
        } => {
            let subjects = subject_table(&root, collect.subjects.as_deref())?;
            let collected = collect_notes(&root, &OpenPdf, &subjects, &collect.options())
                .context("collecting notes failed")?;
            write_report(&root, &output, &collected.collection)?;
        }
    }

    Ok(())
}

fn subject_table(root: &Path, file: Option<&Path>) -> Result<SubjectTable> {
    let mut table = SubjectTable::default();
    if let Some(file) = file {
        let path = resolve(root, file);
        let reader = File::open(&path)
            .with_context(|| format!("cannot open subject table '{}'", path.display()))?;
        let entries: IndexMap<String, SubjectKind> =
            serde_json::from_reader(BufReader::new(reader))
                .context("subject table must map subject strings to \"note\" or \"reply\"")?;
        table.extend(entries);
    }
    Ok(table)
}

fn write_report(
    root: &Path,
    output: &Path,
    tree: &IndexMap<String, CollectionNode>,
) -> Result<()> {
    let report = render_report(tree).context("rendering the report failed")?;
    let path = resolve(root, output);
    std::fs::write(&path, report)
        .with_context(|| format!("cannot write report '{}'", path.display()))?;
    tracing::info!(file = %path.display(), "wrote report");
    Ok(())
}

fn resolve(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    }
}
