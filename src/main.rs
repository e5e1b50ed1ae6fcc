extern crate structopt;
extern crate chain_growth;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use env_logger::Builder;
use log::{info, LevelFilter};
use structopt::StructOpt;

use chain_growth::config::{Preset, RunConfig, SeriesSpec};
use chain_growth::export::{write_csv, write_json};
use chain_growth::render::{render, Output};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "chain-growth",
    about = "Compare block growth across blockchain simulator logs."
)]
struct Opt {
    /// One of bitcoin, pow-growth, three-way
    #[structopt(long = "preset")]
    preset: Option<String>,

    /// JSON run configuration
    #[structopt(long = "config", parse(from_os_str))]
    config: Option<PathBuf>,

    /// Log to plot as path[:label[:scale]]; replaces preset series
    #[structopt(short = "s", long = "series", raw(number_of_values = "1"))]
    series: Vec<String>,

    /// Expected epoch size drawn as the reference line
    #[structopt(long = "baseline")]
    baseline: Option<u64>,

    #[structopt(long = "timeline-len")]
    timeline_len: Option<usize>,

    /// Threshold step between timeline points
    #[structopt(long = "bucket-width")]
    bucket_width: Option<i64>,

    /// Divisor turning raw timestamps into seconds
    #[structopt(long = "divisor")]
    divisor: Option<i64>,

    #[structopt(long = "title")]
    title: Option<String>,

    /// Write the chart to a PNG instead of opening a window
    #[structopt(long = "png", parse(from_os_str))]
    png: Option<PathBuf>,

    #[structopt(long = "csv", parse(from_os_str))]
    csv: Option<PathBuf>,

    #[structopt(long = "json", parse(from_os_str))]
    json: Option<PathBuf>,

    /// Skip gnuplot entirely
    #[structopt(long = "no-plot")]
    no_plot: bool,
}

impl Opt {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(path), _) => RunConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            (None, Some(name)) => name.parse::<Preset>()?.config(),
            (None, None) if self.series.is_empty() => Preset::Bitcoin.config(),
            (None, None) => RunConfig::default(),
        };

        if !self.series.is_empty() {
            config.series = self
                .series
                .iter()
                .map(|s| s.parse::<SeriesSpec>())
                .collect::<chain_growth::Result<_>>()?;
        }
        if let Some(value) = self.baseline {
            config.baseline_value = value;
        }
        if let Some(len) = self.timeline_len {
            config.timeline_len = len;
        }
        if let Some(width) = self.bucket_width {
            config.bucket_width_ms = width;
        }
        if let Some(divisor) = self.divisor {
            config.unit_divisor = divisor;
        }
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::from_args();
    let config = opt.run_config()?;
    let files: Vec<_> = config.series.iter().map(|s| s.path.display().to_string()).collect();
    info!("Parsing files: {:?}", files);

    let chart = chain_growth::run(&config)?;

    if let Some(path) = &opt.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_csv(&chart, BufWriter::new(file))?;
        info!("Wrote {}", path.display());
    }
    if let Some(path) = &opt.json {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_json(&chart, BufWriter::new(file))?;
        info!("Wrote {}", path.display());
    }

    if !opt.no_plot {
        let output = match &opt.png {
            Some(path) => Output::Png {
                path,
                width: 1024,
                height: 768,
            },
            None => Output::Window,
        };
        render(&chart, output)?;
    }
    Ok(())
}
