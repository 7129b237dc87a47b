use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use recall_protocol::ContentKind;
use recall_service::{RecallService, Settings};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "recall")]
#[command(about = "Hybrid lexical + vector search over documents and notes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory holding corpus and index snapshots
    #[arg(long, global = true, default_value = ".recall")]
    data_dir: PathBuf,

    /// Path to a TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a document (summarized, embedded, and indexed on create)
    #[command(name = "add-doc")]
    AddDoc(AddDocArgs),

    /// Ingest a note
    #[command(name = "add-note")]
    AddNote(AddNoteArgs),

    /// Hybrid search across the stored corpus
    Search(SearchArgs),

    /// Show a single stored record
    Show(ShowArgs),
}

#[derive(Args)]
struct AddDocArgs {
    /// Document title
    title: String,

    /// Document body (reads stdin if omitted and --file is not set)
    content: Option<String>,

    /// Read the body from a file instead
    #[arg(long, conflicts_with = "content")]
    file: Option<PathBuf>,

    /// Client the document belongs to
    #[arg(long, default_value_t = 1)]
    client_id: i64,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AddNoteArgs {
    /// Note body (reads stdin if omitted and --file is not set)
    content: Option<String>,

    /// Read the body from a file instead
    #[arg(long, conflicts_with = "content")]
    file: Option<PathBuf>,

    /// Client the note belongs to
    #[arg(long, default_value_t = 1)]
    client_id: i64,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Restrict to one collection: document|note
    #[arg(long, short = 't')]
    r#type: Option<String>,

    /// Maximum number of results
    #[arg(long, short = 'n')]
    limit: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// Collection: document|note
    kind: String,

    /// Record id
    id: i64,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::AddDoc(args) => args.json,
        Commands::AddNote(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Show(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::from_env()?,
    };

    match cli.command {
        Commands::AddDoc(args) => run_add_doc(args, &cli.data_dir, settings).await?,
        Commands::AddNote(args) => run_add_note(args, &cli.data_dir, settings).await?,
        Commands::Search(args) => run_search(args, &cli.data_dir, settings).await?,
        Commands::Show(args) => run_show(args, &cli.data_dir, settings).await?,
    }

    Ok(())
}

fn read_content(content: Option<String>, file: Option<&PathBuf>) -> Result<String> {
    if let Some(raw) = content {
        return Ok(raw);
    }
    if let Some(path) = file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read content from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read content from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Content is empty. Provide it as an argument, --file, or pipe via stdin.");
    }

    Ok(buffer)
}

async fn run_add_doc(args: AddDocArgs, data_dir: &PathBuf, settings: Settings) -> Result<()> {
    let content = read_content(args.content, args.file.as_ref())?;
    let service = RecallService::open(data_dir, settings).await?;

    let document = service
        .create_document(args.client_id, &args.title, &content)
        .await?;
    service.save(data_dir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        eprintln!("Created document {} '{}'", document.id, document.title);
        eprintln!("Summary: {}", document.summary);
    }
    Ok(())
}

async fn run_add_note(args: AddNoteArgs, data_dir: &PathBuf, settings: Settings) -> Result<()> {
    let content = read_content(args.content, args.file.as_ref())?;
    let service = RecallService::open(data_dir, settings).await?;

    let note = service.create_note(args.client_id, &content).await?;
    service.save(data_dir).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&note)?);
    } else {
        eprintln!("Created note {}", note.id);
        eprintln!("Summary: {}", note.summary);
    }
    Ok(())
}

async fn run_search(args: SearchArgs, data_dir: &PathBuf, mut settings: Settings) -> Result<()> {
    if let Some(limit) = args.limit {
        settings.search.result_limit = limit;
    }
    let service = RecallService::open(data_dir, settings).await?;

    let response = service.search(&args.query, args.r#type.as_deref()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        eprintln!(
            "Found {} results for query '{}'",
            response.results.len(),
            response.query
        );
        eprintln!();
        for (i, result) in response.results.iter().enumerate() {
            let title = result.title.as_deref().unwrap_or("(untitled)");
            println!(
                "{}. {}:{} {} (score: {:.4})",
                i + 1,
                result.kind,
                result.id,
                title,
                result.score
            );
            println!("   {}", result.summary);
            println!();
        }
    }
    Ok(())
}

async fn run_show(args: ShowArgs, data_dir: &PathBuf, settings: Settings) -> Result<()> {
    let kind: ContentKind = args
        .kind
        .parse()
        .context("Expected 'document' or 'note'")?;
    let service = RecallService::open(data_dir, settings).await?;

    let Some(record) = service.get(kind, args.id) else {
        anyhow::bail!("No {} with id {}", kind, args.id);
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        if let Some(title) = record.title() {
            println!("# {title}");
        }
        println!("{}", record.content());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn read_content_prefers_inline_argument() {
        let content = read_content(Some("inline body".to_string()), None).unwrap();
        assert_eq!(content, "inline body");
    }

    #[test]
    fn read_content_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        fs::write(&path, "file body").unwrap();

        let content = read_content(None, Some(&path)).unwrap();
        assert_eq!(content, "file body");
    }

    #[test]
    fn read_content_reports_missing_file() {
        let path = PathBuf::from("/nonexistent/body.txt");
        assert!(read_content(None, Some(&path)).is_err());
    }
}
