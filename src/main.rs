#[macro_use]
extern crate tracing;

use std::convert::TryInto;
use std::path::PathBuf;

use structopt::StructOpt;
use tokio::runtime::Builder;
use tokio::signal;
use tokio::sync::mpsc;

use circadian::clock::SystemClock;
use circadian::interval::Interval;
use circadian::models::Config;
use circadian::runner::IntervalRunner;

#[derive(Debug, StructOpt)]
struct Opts {
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u32,
    #[structopt(short, long = "config", default_value = "circadian.toml")]
    config_path: PathBuf,
    #[structopt(long)]
    dump_config: bool,
}

async fn run(opts: Opts) -> color_eyre::eyre::Result<()> {
    // Load configuration
    let config = Config::load_file(&opts.config_path).await?;

    // Dump configuration if this was asked
    if opts.dump_config {
        print!("{}", config.to_string()?);
        return Ok(());
    }

    // Reject degenerate intervals before the update loop starts
    let interval: Interval = config.interval.try_into()?;

    // Spawn the update loop for the configured interval
    let (tx, mut rx) = mpsc::channel(4);
    let (runner, handle) = IntervalRunner::new(interval, SystemClock, tx);
    let runner = tokio::spawn(async move {
        if let Err(error) = runner.run().await {
            error!(error = %error, "interval runner error");
        }
    });

    // Forward the light state stream to the downstream driver until the
    // interval ends
    loop {
        tokio::select! {
            state = rx.recv() => {
                match state {
                    Some(state) => {
                        info!(
                            color_temperature = %state.color_temperature,
                            x = %state.xy[0],
                            y = %state.xy[1],
                            brightness = %state.brightness,
                            "applying light state"
                        );
                        println!("{}", serde_json::to_string(&state)?);
                    }
                    None => break,
                }
            }
            _ = signal::ctrl_c() => {
                info!("interrupt received, retiring interval");
                if let Err(error) = handle.stop().await {
                    warn!(error = %error, "runner already stopped");
                }
            }
        }
    }

    runner.await?;
    Ok(())
}

fn install_tracing(opts: &Opts) -> Result<(), tracing_subscriber::util::TryInitError> {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer();

    let filter_layer = EnvFilter::try_from_env("CIRCADIAN_LOG").unwrap_or_else(|_| {
        EnvFilter::new(match opts.verbose {
            0 => "circadian=warn,circadiand=warn",
            1 => "circadian=info,circadiand=info",
            2 => "circadian=debug,circadiand=debug",
            _ => "circadian=trace,circadiand=trace",
        })
    });

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init()
}

#[paw::main]
fn main(opts: Opts) -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    install_tracing(&opts)?;

    // Create tokio runtime
    let thd_count = match num_cpus::get() {
        1 => 2,
        other => other.min(4),
    };

    let rt = Builder::new_multi_thread()
        .worker_threads(thd_count)
        .enable_all()
        .build()?;
    rt.block_on(run(opts))
}
