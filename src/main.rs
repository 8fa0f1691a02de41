// ABOUTME: Main entry point for the bitacora site.
// ABOUTME: Provides CLI interface and executes commands from the library.

use bitacora::{
    Catalog, Config, HttpImageSource, ImageDirectoryLister, ImageSource, Result, Site, TalkId,
};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the landing page, the carousel and the image listing endpoint
    Serve(ServeArgs),

    /// Print the images found for one talk folder
    ListImages(ListImagesArgs),

    /// Print the numbered list of talks
    Talks(TalksArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server
    #[arg(short, long)]
    port: Option<u16>,

    /// Port for the live carousel channel
    #[arg(long)]
    live_port: Option<u16>,

    /// Directory holding the public files (images live under img/)
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Talk dataset to use instead of the bundled one
    #[arg(long)]
    data: Option<PathBuf>,
}

#[derive(Args)]
struct ListImagesArgs {
    /// Talk folder name (its 1-based position)
    folder: String,

    /// Directory holding the public files
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Base URL of a running site to ask instead of reading the disk
    #[arg(long)]
    remote: Option<String>,
}

#[derive(Args)]
struct TalksArgs {
    /// Talk dataset to use instead of the bundled one
    #[arg(long)]
    data: Option<PathBuf>,
}

fn serve(args: &ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(live_port) = args.live_port {
        config.live_port = live_port;
    }
    if let Some(public_dir) = &args.public_dir {
        config.public_dir = public_dir.clone();
    }
    if let Some(data) = &args.data {
        config.data_path = Some(data.clone());
    }

    let catalog = Catalog::load(config.data_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load talks: {}", e))?;
    let site = Site::bind(&config, catalog).map_err(|e| {
        anyhow::anyhow!(
            "Failed to start site on {}:{} (live {}): {}",
            config.host,
            config.port,
            config.live_port,
            e
        )
    })?;

    if let Some(addr) = site.http_addr() {
        println!("Serving on http://localhost:{}", addr.port());
    }
    site.run();
    Ok(())
}

fn list_images(args: &ListImagesArgs, mut config: Config) -> Result<()> {
    let images = match &args.remote {
        // Only canonical talk numbers map to a remote folder
        Some(base) => match TalkId::parse(&args.folder) {
            Some(talk) => HttpImageSource::new(base)
                .and_then(|source| source.fetch(talk))
                .map_err(|e| anyhow::anyhow!("Failed to list images from {}: {}", base, e))?,
            None => Vec::new(),
        },
        None => {
            if let Some(public_dir) = &args.public_dir {
                config.public_dir = public_dir.clone();
            }
            info!("Listing images under {:?}", config.image_root());
            ImageDirectoryLister::new(config.image_root()).list(&args.folder)
        }
    };

    if images.is_empty() {
        println!("No images found for folder {}", args.folder);
    }
    for image in images {
        println!("{}", image);
    }
    Ok(())
}

fn talks(args: &TalksArgs, config: &Config) -> Result<()> {
    let data = args.data.as_deref().or(config.data_path.as_deref());
    let catalog = Catalog::load(data).map_err(|e| anyhow::anyhow!("Failed to load talks: {}", e))?;
    for (id, talk) in catalog.iter() {
        println!("{:02}  {}", id.get(), talk.title);
    }
    Ok(())
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match &cli.command {
        Some(Commands::Serve(args)) => serve(args, config),
        Some(Commands::ListImages(args)) => list_images(args, config),
        Some(Commands::Talks(args)) => talks(args, &config),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
