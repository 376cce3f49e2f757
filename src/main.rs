//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewOptions;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Content store and HTTP server for a Markdown blog", long_about = None)]
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
    /// Serve the blog over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Reload content when files change
        #[arg(short, long)]
        watch: bool,
    },

    /// List site content
    List {
        /// Type of content to list (post, page, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Build the content store and report problems
    Check,

    /// Create a new post or page
    New {
        /// Title of the new post
        title: String,

        /// Slug, defaults to the slugified title
        #[arg(short, long)]
        slug: Option<String>,

        /// Category of the new post
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Create a page instead of a post
        #[arg(long)]
        page: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip, watch } => {
            let site = folio::Site::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&site, &ip, port, watch).await?;
        }

        Commands::List { r#type } => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::list::run(&site, &r#type)?;
        }

        Commands::Check => {
            let site = folio::Site::new(&base_dir)?;
            folio::commands::check::run(&site)?;
        }

        Commands::New {
            title,
            slug,
            category,
            page,
        } => {
            let site = folio::Site::new(&base_dir)?;
            let options = NewOptions {
                title,
                slug,
                category,
                page,
            };
            let path = site.new_post(&options)?;
            println!("Created: {}", path.display());
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
