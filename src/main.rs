//! CLI entry point for coders-on-beer

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coders_on_beer::{commands, Blog};

#[derive(Parser)]
#[command(name = "coders-on-beer")]
#[command(version)]
#[command(about = "Static site generator and dev server for the Coders on Beer blog", long_about = None)]
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
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Post id (defaults to the next free id)
        #[arg(long)]
        id: Option<u64>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Bundle markdown content into importable modules
    Bundle {
        /// Output format (js, rust)
        #[arg(short, long, default_value = "js")]
        format: String,

        /// Output directory (defaults to the configured bundle_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// List posts
    List,

    /// Show how a URL path resolves
    Route {
        /// URL path, e.g. /posts/42
        path: String,
    },

    /// Clean the public and bundle folders
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "coders_on_beer=debug,info"
    } else {
        "coders_on_beer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::New { title, id } => {
            let blog = Blog::new(&base_dir)?;
            let path = blog.new_post(&title, id)?;
            println!("Created: {:?}", path);
        }

        Commands::Generate => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Generating static files...");
            blog.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Starting server at http://{}:{}", ip, port);
            coders_on_beer::server::start(&blog, &ip, port, !r#static, open).await?;
        }

        Commands::Bundle { format, out } => {
            let blog = Blog::new(&base_dir)?;
            let written = commands::bundle::run(&blog, &format, out.as_deref())?;
            for path in written {
                println!("  {}", path.display());
            }
        }

        Commands::List => {
            let blog = Blog::new(&base_dir)?;
            commands::list::run(&blog)?;
        }

        Commands::Route { path } => {
            commands::route::run(&path)?;
        }

        Commands::Clean => {
            let blog = Blog::new(&base_dir)?;
            tracing::info!("Cleaning output folders...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("coders-on-beer version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
