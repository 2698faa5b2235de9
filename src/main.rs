use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use bids::extract::Mode;
use bids::fetch::DEFAULT_PDF_URL;
use bids::pipeline::{self, Config, Retain, DEFAULT_OUT_PATH};

#[derive(Parser)]
#[command(name = "bids", about = "Convert the trustee sale bids PDF into JSON records")]
struct Cli {
    /// PDF to convert: an http(s) URL or a local path
    #[arg(long, env = "BIDSONLINE_URL", default_value = DEFAULT_PDF_URL)]
    url: String,

    /// Where to write the JSON array
    #[arg(long, env = "OUT_PATH", default_value = DEFAULT_OUT_PATH)]
    out: PathBuf,

    /// Table detection strategy
    #[arg(long, env = "EXTRACT_MODE", value_enum, default_value = "stream")]
    mode: Mode,

    /// Which assembled rows to keep
    #[arg(long, env = "RETAIN_POLICY", value_enum, default_value = "identity")]
    retain: Retain,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config {
        url: cli.url,
        out: cli.out,
        mode: cli.mode,
        retain: cli.retain,
    };

    let written = pipeline::run(&config)
        .await
        .with_context(|| format!("converting {}", config.url))?;

    println!("Wrote {} records to {}", written, config.out.display());
    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("Done in {:.1}s", elapsed.as_secs_f64());
    }
    Ok(())
}
