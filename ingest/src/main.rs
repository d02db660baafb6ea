use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dms_core::extract::{DefaultExtractor, TextExtractor};
use dms_core::persist::{init_data_dir, DataPaths};
use dms_core::store::SledDocumentStore;
use dms_core::{AnalysisConfig, Analyzer, DocumentId, DocumentService, FileType, SearchQuery};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Load, analyze and query documents in a data directory", long_about = None)]
struct Cli {
    /// Data directory shared with the server
    #[arg(long, default_value = "./data", global = true)]
    data_dir: String,
    /// Optional JSON analysis config
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload and process a file, or every supported file under a directory
    Add {
        #[arg(long)]
        input: String,
        /// Owner recorded on the documents
        #[arg(long, default_value = "ingest")]
        user: String,
        /// Title for a single file; defaults to the file stem
        #[arg(long)]
        title: Option<String>,
    },
    /// List stored documents, newest first
    List,
    /// Rank stored documents against a query
    Search {
        #[arg(long)]
        q: String,
        #[arg(long, default_value_t = 20)]
        page_size: usize,
    },
    /// Run extraction and analysis again for one document
    Reprocess {
        #[arg(long)]
        id: DocumentId,
    },
    /// Print summary and keywords of a file without storing it
    Analyze {
        #[arg(long)]
        input: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    }
    .with_env_overrides();
    let analyzer = Analyzer::new(config);

    match cli.command {
        Commands::Analyze { input } => analyze_file(&analyzer, Path::new(&input)),
        Commands::Add { input, user, title } => {
            let svc = open_service(&cli.data_dir, analyzer)?;
            add_documents(&svc, Path::new(&input), &user, title.as_deref())
        }
        Commands::List => list_documents(&open_service(&cli.data_dir, analyzer)?),
        Commands::Search { q, page_size } => {
            let svc = open_service(&cli.data_dir, analyzer)?;
            let query = SearchQuery { page_size, ..SearchQuery::new(q) };
            let results = svc.search(&query)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Commands::Reprocess { id } => {
            let svc = open_service(&cli.data_dir, analyzer)?;
            if svc.get(id)?.is_none() {
                bail!("no document with id {id}");
            }
            let ok = svc.process(id)?;
            tracing::info!(id, ok, "reprocessed");
            Ok(())
        }
    }
}

fn open_service(data_dir: &str, analyzer: Analyzer) -> Result<DocumentService> {
    let paths = DataPaths::new(data_dir);
    init_data_dir(&paths)?;
    let store = SledDocumentStore::open(paths.db()).with_context(|| format!("cannot open database in {data_dir}"))?;
    Ok(DocumentService::new(Arc::new(store), Arc::new(DefaultExtractor), analyzer, paths))
}

fn collect_files(input: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && p.to_str().and_then(FileType::from_file_name).is_some() {
                files.push(p.to_path_buf());
            }
        }
        files.sort();
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

fn add_documents(svc: &DocumentService, input: &Path, user: &str, title: Option<&str>) -> Result<()> {
    let files = collect_files(input);
    if files.is_empty() {
        bail!("no PDF, TXT or DOCX files found at {}", input.display());
    }
    let single = files.len() == 1;
    let (mut processed, mut failed) = (0usize, 0usize);
    for file in files {
        let file_name = file.file_name().and_then(|s| s.to_str()).unwrap_or_default().to_string();
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or(&file_name).to_string();
        let title = match title {
            Some(t) if single => t.to_string(),
            _ => stem,
        };
        let bytes = fs::read(&file).with_context(|| format!("cannot read {}", file.display()))?;
        let doc = match svc.upload(&title, &file_name, &bytes, user) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(file = %file.display(), error = %e, "skipped");
                failed += 1;
                continue;
            }
        };
        if svc.process(doc.id)? {
            processed += 1;
        } else {
            failed += 1;
        }
    }
    tracing::info!(processed, failed, "ingest complete");
    Ok(())
}

fn list_documents(svc: &DocumentService) -> Result<()> {
    for doc in svc.list()? {
        let date = doc.upload_date.format(&Rfc3339).unwrap_or_default();
        println!("{}\t{}\t{}\t{:?}\t{}\t{}", doc.id, date, doc.file_type, doc.processing_status, doc.uploaded_by, doc.title);
    }
    Ok(())
}

fn analyze_file(analyzer: &Analyzer, input: &Path) -> Result<()> {
    let name = input.to_string_lossy();
    let Some(file_type) = FileType::from_file_name(&name) else {
        bail!("unsupported file type: {name}");
    };
    let bytes = fs::read(input).with_context(|| format!("cannot read {name}"))?;
    let text = DefaultExtractor.extract(&bytes, file_type)?;
    let out = serde_json::json!({
        "summary": analyzer.summarize(&text),
        "keywords": analyzer.extract_keywords(&text),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
