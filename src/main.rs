use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use kidsheet::engine::{Launcher, NoopLauncher};
use kidsheet::{ServiceConfig, WorksheetService, WorksheetTypeId};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kidsheet", about = "Generate printable kids' worksheets", version)]
struct Cli {
    /// JSON configuration file; environment variables still apply on top
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered worksheet types
    Types,
    /// Print the resolved content spec as JSON
    Synth(RequestArgs),
    /// Write the composed HTML page
    Compose {
        #[command(flatten)]
        request: RequestArgs,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render pages to PNG and print their URLs
    Render {
        #[command(flatten)]
        request: RequestArgs,
        /// Number of independent pages (1-5)
        #[arg(long, default_value_t = 1)]
        pages: u32,
        /// Use the noop engine instead of Chrome
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Worksheet type id, e.g. `number-bonds`
    kind: String,
    /// Request data as inline JSON, e.g. '{"theme":"ocean","difficulty":"hard"}'
    #[arg(long)]
    data: Option<String>,
    /// Seed for reproducible content
    #[arg(long)]
    seed: Option<u64>,
}

impl RequestArgs {
    fn data(&self) -> Result<Value> {
        match &self.data {
            Some(raw) => serde_json::from_str(raw).context("--data is not valid JSON"),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?.apply_env()?,
        None => ServiceConfig::from_env()?,
    };

    match cli.command {
        Command::Types => {
            for kind in WorksheetTypeId::ALL {
                println!("{:<22} {:?}", kind.as_str(), kind.category());
            }
        }
        Command::Synth(request) => {
            let service = WorksheetService::new(config, NoopLauncher::default())?;
            let req = service.request(&request.kind, request.data()?)?;
            let spec = service.synthesize(&req, request.seed)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        Command::Compose { request, out } => {
            let service = WorksheetService::new(config, NoopLauncher::default())?;
            let req = service.request(&request.kind, request.data()?)?;
            let spec = service.synthesize(&req, request.seed)?;
            let doc = service.compose(spec).await;
            match out {
                Some(path) => {
                    std::fs::write(&path, &doc.html).with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("Wrote {} ({})", path.display(), doc.fingerprint());
                }
                None => println!("{}", doc.html),
            }
        }
        Command::Render {
            request,
            pages,
            dry_run,
        } => {
            if dry_run {
                let service = WorksheetService::new(config, NoopLauncher::default())?;
                render(service, &request, pages).await?;
            } else {
                render_with_chrome(config, &request, pages).await?;
            }
        }
    }
    Ok(())
}

#[cfg(feature = "cdp")]
async fn render_with_chrome(config: ServiceConfig, request: &RequestArgs, pages: u32) -> Result<()> {
    render(WorksheetService::with_chrome(config)?, request, pages).await
}

#[cfg(not(feature = "cdp"))]
async fn render_with_chrome(_config: ServiceConfig, _request: &RequestArgs, _pages: u32) -> Result<()> {
    Err(anyhow!("built without the `cdp` feature; pass --dry-run to use the noop engine"))
}

async fn render<L: Launcher>(service: WorksheetService<L>, request: &RequestArgs, pages: u32) -> Result<()> {
    let result = service
        .generate_pages_seeded(&request.kind, request.data()?, pages, request.seed)
        .await;
    service.shutdown().await;

    let urls = result.map_err(|e| anyhow!(e))?;
    for url in urls {
        println!("{}", url);
    }
    Ok(())
}
