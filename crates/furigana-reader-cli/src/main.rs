//! Furigana Reader CLI - Import and read annotated HTML documents from a terminal.

mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use furigana_reader_core::{
    AppConfig, CachedTranslationService, Lang, Library, Provider, ResponseCache,
    TranslationService, TranslatorRegistry,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "furigana-read")]
#[command(author, version, about = "Read furigana-annotated documents with machine translation", long_about = None)]
struct Args {
    /// Library directory (default: $XDG_DATA_HOME/furigana-reader)
    #[arg(short, long, env = "FURIGANA_LIBRARY_DIR")]
    library: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an annotated HTML file to the library
    Import {
        /// HTML file to import
        file: PathBuf,

        /// Folder name; created when missing
        #[arg(short, long)]
        folder: String,

        /// Document name (default: file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List folders, documents and tags
    List,

    /// Open a document in an interactive reader
    Read {
        /// Document id (see `list`)
        id: String,

        /// Translation provider (deepl, google, claude)
        #[arg(short, long)]
        provider: Option<Provider>,

        /// Target language code
        #[arg(long)]
        lang: Option<String>,

        /// Print rendered HTML instead of plain text
        #[arg(long)]
        raw: bool,

        /// Disable the translation response cache
        #[arg(long)]
        no_cache: bool,
    },
}

fn import(library: &Library, file: &Path, folder: &str, name: Option<String>) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let folder = match library.find_folder_by_name(folder)? {
        Some(existing) => existing,
        None => library.create_folder(folder)?,
    };
    let name = name.unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string()
    });

    let doc = library.create_document(&name, &folder.id)?;
    let doc = library.set_document_html(&doc.id, &html)?;
    let pages = furigana_reader_core::page_count(&html);
    info!("Imported {} into {}", file.display(), folder.name);

    #[allow(clippy::print_stdout)]
    {
        println!("{}  {} ({} pages) in {}", doc.id, doc.name, pages, folder.name);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn list(library: &Library) -> Result<()> {
    let snapshot = library.snapshot()?;

    for folder in &snapshot.folders {
        println!("{} [{}]", folder.name, folder.id);
        for doc in snapshot.documents.iter().filter(|d| d.folder_id == folder.id) {
            let status = if doc.html_file.is_some() { "" } else { " (no HTML)" };
            let tags: Vec<&str> = doc
                .tag_ids
                .iter()
                .filter_map(|id| snapshot.tags.iter().find(|t| &t.id == id))
                .map(|t| t.name.as_str())
                .collect();
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" #{}", tags.join(" #"))
            };
            println!("  {}  {}  page {}{}{}", doc.id, doc.name, doc.last_page.max(1), status, tags);
        }
    }
    if !snapshot.tags.is_empty() {
        let names: Vec<String> = snapshot
            .tags
            .iter()
            .map(|t| format!("{} ({})", t.name, t.color))
            .collect();
        println!("Tags: {}", names.join(", "));
    }
    Ok(())
}

fn translation_service(config: &AppConfig, no_cache: bool) -> Result<Arc<dyn TranslationService>> {
    let translator = config.translator.clone().with_env_keys();
    let registry = Arc::new(
        TranslatorRegistry::from_config(&translator).context("Failed to initialize translators")?,
    );
    if no_cache || !(config.cache.memory_enabled || config.cache.disk_enabled) {
        return Ok(registry);
    }

    let cache = ResponseCache::new(&config.cache).context("Failed to open translation cache")?;
    Ok(Arc::new(CachedTranslationService::new(
        registry,
        Arc::new(cache),
        translator.source_lang,
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };
    if args.library.is_some() {
        config.library.data_dir = args.library.clone();
    }

    let library_dir = config.library.resolved_dir();
    let library = Library::open(&library_dir)
        .with_context(|| format!("Failed to open library at {}", library_dir.display()))?;

    match args.command {
        Command::Import { file, folder, name } => import(&library, &file, &folder, name),
        Command::List => list(&library),
        Command::Read {
            id,
            provider,
            lang,
            raw,
            no_cache,
        } => {
            if let Some(provider) = provider {
                config.reader.default_provider = provider;
            }
            if let Some(lang) = lang {
                config.reader.default_target_lang = Lang::new(lang);
            }
            let service = translation_service(&config, no_cache)?;
            repl::run(&library, &id, service, &config.reader, raw).await
        }
    }
}
