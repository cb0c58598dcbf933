//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::{commands, server, Site};

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Markdown post pipeline and content hydration for a portfolio blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert posts and write the manifest
    #[command(alias = "b")]
    Build {
        /// Rebuild when posts change
        #[arg(short, long)]
        watch: bool,
    },

    /// Scaffold a new post folder
    New {
        /// Title of the new post
        title: String,

        /// Folder name and slug (defaults to the slugified title)
        #[arg(short, long)]
        slug: Option<String>,
    },

    /// List the posts in the manifest
    List,

    /// Delete generated output
    Clean,

    /// Print the hydrated HTML of a post
    Hydrate {
        /// Slug of the post
        slug: String,
    },

    /// Start a local preview server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Disable file watching and live reload
        #[arg(long)]
        no_watch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "folio=debug,info" } else { "folio=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    let site = Site::new(&base_dir)?;

    match cli.command {
        Commands::Build { watch } => {
            commands::build::run(&site)?;
            if watch {
                commands::build::watch(&site, |_| {})?;
            }
        }

        Commands::New { title, slug } => {
            let path = commands::new::create_post(&site, &title, slug.as_deref())?;
            println!("Created: {:?}", path);
            println!("Fill in the excerpt before building.");
        }

        Commands::List => commands::list::run(&site)?,

        Commands::Clean => {
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Hydrate { slug } => commands::hydrate::run(&site, &slug)?,

        Commands::Serve { port, no_watch } => {
            commands::build::run(&site)?;
            server::start(&site, port, !no_watch).await?;
        }
    }

    Ok(())
}
