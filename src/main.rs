use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use filedrop::client::{files_in_dir, DEFAULT_SERVER};
use filedrop::{Client, Config, WebServer};

#[derive(Parser)]
#[command(name = "filedrop")]
#[command(version, about = "Date-bucketed HTTP file exchange", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    /// Upload files to a server
    Push {
        /// Single file to upload
        #[arg(short, long, conflicts_with = "dir")]
        file: Option<PathBuf>,
        /// Upload every file in this directory (default: current directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Target folder on the server
        #[arg(long, default_value = "uploads")]
        folder: String,
        /// Server URL
        #[arg(short, long, env = "FILEDROP_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Download today's files from a server
    Pull {
        /// Destination directory
        #[arg(short, long, default_value = "downloads")]
        dir: PathBuf,
        /// Server URL
        #[arg(short, long, env = "FILEDROP_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Bind address (overrides config)
    #[arg(long)]
    host: Option<String>,
    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,
    /// Storage root (overrides config)
    #[arg(long)]
    root: Option<String>,
    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { config, command } = Cli::parse();

    match command.unwrap_or_else(|| Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => serve(&config, args).await,
        Commands::Push {
            file,
            dir,
            folder,
            server,
        } => {
            filedrop::logging::init_console_only("info");
            push(file, dir, &folder, &server).await
        }
        Commands::Pull { dir, server } => {
            filedrop::logging::init_console_only("info");
            pull(&dir, &server).await
        }
    }
}

fn load_config(path: &Path) -> Config {
    match Config::load_with_env(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    }
}

async fn serve(config_path: &Path, args: ServeArgs) -> ExitCode {
    let mut config = load_config(config_path);

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(root) = args.root {
        config.storage.root = root;
    }
    if args.debug {
        config.logging.level = "debug".to_string();
    }

    // Initialize logging
    if let Err(e) = filedrop::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        filedrop::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!("filedrop - date-bucketed file exchange");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let server = match WebServer::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Endpoints:");
    info!("  POST /api/upload      store a file in today's bucket");
    info!("  GET  /api/download    today's downloads");
    info!("  GET  /api/list-files  list stored files");
    info!("  GET  /api/file/<folder>/<bucket>/<name>");
    info!("  GET  /api/health");

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Web server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn push(file: Option<PathBuf>, dir: Option<PathBuf>, folder: &str, server: &str) -> ExitCode {
    let files = match file {
        Some(file) => vec![file],
        None => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            match files_in_dir(&dir) {
                Ok(files) => files,
                Err(e) => {
                    error!("Cannot read {}: {}", dir.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    if files.is_empty() {
        warn!("No files to upload");
        return ExitCode::FAILURE;
    }

    let client = match Client::new(server) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = client.push(&files, folder).await;
    println!(
        "Uploaded {} of {} file(s) to {}",
        report.uploaded.len(),
        files.len(),
        server
    );
    for (path, e) in &report.failed {
        println!("  failed: {} ({})", path.display(), e);
    }

    if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn pull(dir: &Path, server: &str) -> ExitCode {
    let client = match Client::new(server) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match client.pull(dir).await {
        Ok(saved) if saved.is_empty() => {
            println!("No files available for today");
            ExitCode::SUCCESS
        }
        Ok(saved) => {
            println!("Downloaded {} file(s) to {}", saved.len(), dir.display());
            for path in saved {
                println!("  {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Download failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
