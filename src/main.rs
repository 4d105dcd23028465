use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use stash_media::{
    AssetId, ClusterId, Derivative, FfmpegTool, LibraryOptions, MediaLibrary, MemoryGroupStore,
    warm_cluster,
};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "stash-media", about = "Thumbnails, placeholders and group trees for a media stash")]
struct Cli {
    /// JSON file with library options.
    #[arg(long, env = "STASH_MEDIA_CONFIG")]
    config: Option<PathBuf>,
    /// Library root holding `media/` and `thumbnails/`. Overrides the config file.
    #[arg(long, env = "STASH_MEDIA_ROOT")]
    root: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write an asset's WEBP thumbnail, generating and caching it if needed.
    Thumbnail {
        cluster: ClusterId,
        asset: AssetId,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write an asset's SVG placeholder.
    Placeholder {
        cluster: ClusterId,
        asset: AssetId,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the raw probe document of an asset.
    Info { cluster: ClusterId, asset: AssetId },
    /// Print the group tree of a cluster, read from a JSON array of group rows.
    Groups {
        cluster: ClusterId,
        #[arg(long)]
        rows: Option<PathBuf>,
    },
    /// Generate missing thumbnails for every asset in a cluster.
    Warm {
        cluster: ClusterId,
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut options = match &cli.config {
        Some(path) => LibraryOptions::from_json_file(path)?,
        None => LibraryOptions::default(),
    };
    if let Some(root) = cli.root {
        options.root = root;
    }

    let store = match &cli.command {
        Command::Groups {
            rows: Some(rows), ..
        } => MemoryGroupStore::from_json_file(rows)?,
        _ => MemoryGroupStore::new(),
    };
    let library = MediaLibrary::new(&options, FfmpegTool::from_options(&options), store);

    match cli.command {
        Command::Thumbnail { cluster, asset, out } => {
            let derivative = library.get_thumbnail(cluster, asset).await?;
            emit(&derivative, out).await?;
        }
        Command::Placeholder { cluster, asset, out } => {
            let derivative = library.get_placeholder(cluster, asset).await?;
            emit(&derivative, out).await?;
        }
        Command::Info { cluster, asset } => {
            let info = library.get_media_info(cluster, asset).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Groups { cluster, .. } => {
            let tree = library.get_group_tree(cluster).await?;
            println!("{}", serde_json::to_string_pretty(&tree)?);
        }
        Command::Warm {
            cluster,
            concurrency,
        } => {
            let summary = warm_cluster(&library, cluster, concurrency).await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if !summary.failed.is_empty() {
                return Err(eyre!(
                    "{} thumbnail(s) could not be generated",
                    summary.failed.len()
                ));
            }
        }
    }

    Ok(())
}

async fn emit(derivative: &Derivative, out: Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, &derivative.bytes).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&derivative.bytes).await?;
            stdout.flush().await?;
        }
    }
    Ok(())
}
