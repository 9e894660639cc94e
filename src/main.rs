mod camera;
mod colors;
mod config;
mod dashboard;
mod data;
mod error;
mod export;
mod filter;
mod geo;
mod heatmap;
mod help;
mod history;
mod logging;
mod metrics;
mod particles;
mod search;
mod settings;
mod terminal;
mod texture;
mod topology;
mod viz;

use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::prelude::*;
use std::path::PathBuf;
use tracing::{info, warn};

use config::{DashboardConfig, DashboardOverrides};
use data::{LatencySource, Provider, SyntheticSource};
use error::{Error, Result};
use filter::ViewMode;
use heatmap::Heatmap;
use history::{HistoryView, TimeRange};
use settings::Settings;

#[derive(Parser)]
#[command(name = "latency-globe")]
#[command(author = "Terminal Art Generator")]
#[command(version)]
#[command(about = "Exchange and cloud-region latency on a rotating terminal globe", long_about = None)]
struct Cli {
    /// Log file for the interactive dashboard
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log filter, e.g. `info` or `latency_globe=debug`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive globe dashboard
    Globe {
        /// Animation speed (seconds per frame)
        #[arg(short, long)]
        time: Option<f32>,

        /// Seconds between latency refreshes
        #[arg(short, long)]
        refresh: Option<f64>,

        /// Random seed for reproducibility
        #[arg(short, long)]
        seed: Option<u64>,

        /// Initial view: heatmap or topology
        #[arg(short, long)]
        view: Option<ViewMode>,

        /// Active providers (comma-separated: aws,gcp,azure)
        #[arg(short, long, value_delimiter = ',')]
        providers: Option<Vec<Provider>>,

        /// Lower bound of the latency filter in ms
        #[arg(long)]
        min_latency: Option<u32>,

        /// Upper bound of the latency filter in ms
        #[arg(long)]
        max_latency: Option<u32>,

        /// Start with order flow particles off
        #[arg(long)]
        no_order_flow: bool,

        /// Idle spin in degrees per second
        #[arg(long)]
        auto_rotate: Option<f64>,

        /// Equirectangular world image used as the globe surface
        #[arg(long)]
        world_map: Option<PathBuf>,

        /// Directory for CSV exports
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Write one latency snapshot to CSV and print its path
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Rasterize one latency snapshot to a PNG heatmap
    Heatmap {
        #[arg(short, long, default_value = "latency-heatmap.png")]
        output: PathBuf,

        /// Texture width and height in pixels, at most 4096
        #[arg(long, default_value_t = heatmap::DEFAULT_SIZE)]
        size: usize,

        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Print a simulated latency series for one exchange pair
    History {
        /// Source exchange id, e.g. binance-tokyo
        #[arg(long)]
        from: String,

        /// Destination exchange id
        #[arg(long)]
        to: String,

        /// 1h, 24h, 7d or 30d
        #[arg(short, long, default_value = "1h")]
        range: TimeRange,

        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (settings, settings_error) = match Settings::load() {
        Ok(s) => (s, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let level = cli.log_level.as_deref().or(settings.logging.level.as_deref());

    // The dashboard owns the terminal, so it logs to a file
    if matches!(cli.command, Commands::Globe { .. }) {
        let log_path = cli
            .log_file
            .clone()
            .or_else(|| settings.logging.file.clone())
            .unwrap_or_else(logging::default_log_path);
        logging::init_file(&log_path, level)?;
    } else {
        logging::init_stderr(level);
    }
    if let Some(e) = settings_error {
        warn!(error = %e, "ignoring settings file, using defaults");
    }

    match cli.command {
        Commands::Globe {
            time,
            refresh,
            seed,
            view,
            providers,
            min_latency,
            max_latency,
            no_order_flow,
            auto_rotate,
            world_map,
            export_dir,
        } => {
            let overrides = DashboardOverrides {
                time_step: time,
                refresh_secs: refresh,
                seed,
                view,
                providers,
                min_latency,
                max_latency,
                no_order_flow,
                auto_rotate,
                world_map,
                export_dir,
            };
            let config = DashboardConfig::resolve(&settings.dashboard, &overrides);
            viz::globe::run(&config)?;
        }
        Commands::Export { dir, seed } => {
            let readings = SyntheticSource::new(seed).sample();
            let path = export::export_to_dir(&dir, &readings, Utc::now())?;
            println!("{}", path.display());
        }
        Commands::Heatmap { output, size, seed } => {
            if size == 0 || size > heatmap::MAX_SIZE {
                return Err(Error::InvalidArgument { name: "size", value: size.to_string() });
            }
            let readings = SyntheticSource::new(seed).sample();
            let mut heatmap = Heatmap::new(size);
            heatmap.rebuild(&readings);
            heatmap.save_png(&output)?;
            info!(path = %output.display(), size = heatmap.size(), readings = readings.len(), "heatmap written");
            println!("{}", output.display());
        }
        Commands::History { from, to, range, seed } => {
            let mut rng = rng_for(seed);
            let mut source = SyntheticSource::new(Some(rng.gen()));
            let link = source
                .sample()
                .into_iter()
                .find(|r| (r.from == from && r.to == to) || (r.from == to && r.to == from))
                .ok_or_else(|| {
                    warn!(%from, %to, "no such link");
                    Error::UnknownLink { from: from.clone(), to: to.clone() }
                })?;

            let view = HistoryView::open(link, range, &mut rng);
            println!("{} -> {} ({})", view.link.from, view.link.to, view.range);
            for p in &view.series {
                println!("{}  {:>7.2} ms", export::iso_timestamp(&p.timestamp), p.latency);
            }
            println!(
                "Current {:.2} ms  Min {:.2} ms  Max {:.2} ms  Avg {:.2} ms",
                view.link.latency, view.stats.min, view.stats.max, view.stats.avg
            );
        }
    }

    Ok(())
}
