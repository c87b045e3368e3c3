mod cli;

use anyhow::{Context, Result};
use log::{error, info};

use tabstrip_builder::download::HttpFetcher;
use tabstrip_builder::{BuildConfig, Mode, Pipeline};

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            println!("Error: failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        error!("{e:#}");
        println!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<()> {
    let args = cli::parse_from(std::env::args_os())?;

    let mut cfg = BuildConfig::load(args.config.as_deref())?;
    if let Some(work_dir) = args.work_dir {
        cfg.work_dir = work_dir;
    }
    if let Some(kind) = args.preprocessor {
        cfg.preprocessor = kind;
    }
    cfg.fix_imports |= args.fix_imports;

    let fetcher = HttpFetcher::new(&cfg.user_agent).context("Failed to build HTTP client")?;
    let mode = Mode::from_arg(args.mode.as_deref());
    let report = Pipeline::new(fetcher, cfg).run(mode).await?;

    match report.mode {
        Mode::CopyOnly => info!("Copied sibling sources (tag {})", report.tag),
        Mode::Full => println!(
            "Successfully processed files for Chromium version {}",
            report.tag
        ),
    }
    Ok(())
}
