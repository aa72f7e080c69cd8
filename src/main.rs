use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use exifscan::config::Config;
use exifscan::db::{Database, MetadataStore};
use exifscan::logging;
use exifscan::scanner::{metadata, ImportProgress, Importer};

/// Import a directory tree of photos into a database.
#[derive(Parser)]
#[command(name = "exifscan", version, about)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true, env = "EXIFSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite file path or postgresql:// URL, overriding the config file
    #[arg(long, global = true, env = "EXIFSCAN_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Import every image under ROOT (the default command)
    Import {
        /// Directory to import; falls back to EXIFSCAN_ROOT, then scanner.root
        root: Option<PathBuf>,
    },
    /// Create the database tables and exit
    InitDb,
    /// Print every tag decoded from one file
    Tags { file: PathBuf },
    /// List imported files indexed under KEYWORD
    Search { keyword: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    let mut config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(ref url) = cli.database_url {
        config.database.apply_url(url);
    }

    match cli.command.unwrap_or(Command::Import { root: None }) {
        Command::Import { root } => run_import(&config, root),
        Command::InitDb => init_db(&config),
        Command::Tags { file } => print_tags(&file),
        Command::Search { keyword } => search(&config, &keyword),
    }
}

fn open_database(config: &Config) -> Result<Database> {
    let db = Database::open(&config.database).context("Failed to connect to database")?;
    db.initialize().context("Failed to create database schema")?;
    Ok(db)
}

fn run_import(config: &Config, root: Option<PathBuf>) -> Result<()> {
    let root = root.or_else(|| config.scanner.root.clone()).context(
        "No directory to import: pass ROOT, set EXIFSCAN_ROOT or scanner.root in the config file",
    )?;
    let db = open_database(config)?;

    let importer = Importer::new(config.scanner.clone(), config.keywords);
    let summary = importer.import_directory(&root, &db, |event| match event {
        ImportProgress::Directory { path } => println!("{}", path.display()),
        ImportProgress::Failed { path, message } => {
            println!("Error extracting EXIF data from {}: {}", path.display(), message)
        }
        ImportProgress::Imported { .. } => {}
    })?;

    println!("{summary}");
    Ok(())
}

fn init_db(config: &Config) -> Result<()> {
    open_database(config)?;
    println!("Schema created successfully");
    Ok(())
}

fn print_tags(file: &Path) -> Result<()> {
    let entries = metadata::dump_tags(file)
        .with_context(|| format!("Failed to read tags from {}", file.display()))?;
    for entry in entries {
        println!("{} {} {}", entry.group, entry.name, entry.value);
    }
    Ok(())
}

fn search(config: &Config, keyword: &str) -> Result<()> {
    let db = open_database(config)?;
    for image in db.find_images_by_keyword(&keyword.to_lowercase())? {
        println!("{}", image.filepath.unwrap_or_default());
    }
    Ok(())
}
