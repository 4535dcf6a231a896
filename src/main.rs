use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

use synext::config::Config;
use synext::document::SyndicationDocument;
use synext::entity::SyndicationEntity;
use synext::extension::{catalog, LoadSettings};

/// Get the default config file path (~/.config/synext/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("synext")
        .join("config.toml"))
}

/// Writes `content` next to `dst`, then renames it into place.
///
/// `create_new` refuses an existing file or symlink at the temp path.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    let temp_path = dst.with_extension(format!("{}.tmp", std::process::id()));
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| format!("Failed to create {}", temp_path.display()))?;

    let synced = file.write_all(content).and_then(|()| file.sync_all());
    drop(file);
    if let Err(e) = synced.and_then(|()| std::fs::rename(&temp_path, dst)) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).with_context(|| format!("Failed to write {}", dst.display()));
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "synext", about = "Inspect and export syndication feed extensions")]
struct Args {
    /// Config file (defaults to ~/.config/synext/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in extensions
    Catalog,

    /// Show the extensions found in one or more feed files
    Inspect {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },

    /// Write the extensions of a feed as a skeleton feed
    Export {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

fn print_catalog() {
    println!("{:<22} {:<16} {:<8} NAMESPACE", "KIND", "PREFIX", "VERSION");
    for ty in catalog::builtin_extension_types() {
        let Some(instance) = ty.instantiate() else {
            continue;
        };
        let d = instance.descriptor();
        println!(
            "{:<22} {:<16} {:<8} {}",
            ty.kind().to_string(),
            d.prefix(),
            d.version().to_string(),
            d.namespace()
        );
    }
}

fn describe_entity(label: &str, entity: &SyndicationEntity) -> Option<String> {
    if entity.extensions.is_empty() {
        return None;
    }
    let names: Vec<String> = entity
        .extensions
        .iter()
        .map(|e| e.descriptor().prefix().to_string())
        .collect();
    Some(format!("  {} <{}>: {}", label, entity.name, names.join(", ")))
}

async fn inspect(files: Vec<PathBuf>, settings: LoadSettings, max_size: u64) -> Result<()> {
    // Loads run on blocking threads and share the process-wide catalog.
    let tasks = files.into_iter().map(|path| {
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || {
            let result = SyndicationDocument::load(&path, &settings, max_size);
            (path, result)
        })
    });

    let mut failures = 0;
    for joined in futures::future::join_all(tasks).await {
        let (path, result) = joined.context("Inspect task panicked")?;
        match result {
            Ok(doc) => {
                println!(
                    "{} ({}, {} items)",
                    path.display(),
                    doc.format,
                    doc.items.len()
                );
                if let Some(line) = describe_entity("channel", &doc.channel) {
                    println!("{}", line);
                }
                for (i, item) in doc.items.iter().enumerate() {
                    if let Some(line) = describe_entity(&format!("item {}", i + 1), item) {
                        println!("{}", line);
                    }
                }
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(path = %path.display(), error = %e, "Failed to load feed");
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} file(s) could not be loaded", failures);
    }
    Ok(())
}

fn export(
    file: &Path,
    output: Option<&Path>,
    settings: &LoadSettings,
    max_size: u64,
) -> Result<()> {
    let doc = SyndicationDocument::load(file, settings, max_size)
        .with_context(|| format!("Failed to load feed: {}", file.display()))?;
    let xml = doc.to_xml().context("Failed to serialize extensions")?;

    match output {
        Some(path) => {
            atomic_write(path, xml.as_bytes())?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", xml),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
    let settings = config.load_settings();

    match args.command {
        Command::Catalog => print_catalog(),
        Command::Inspect { files } => inspect(files, settings, config.max_document_size).await?,
        Command::Export { file, output } => {
            export(&file, output.as_deref(), &settings, config.max_document_size)?
        }
    }

    Ok(())
}
