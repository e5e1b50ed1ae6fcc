//! What a single growth run looks at and how it draws it.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::growth::{DEFAULT_BUCKET_WIDTH_MS, DEFAULT_TIMELINE_LEN};
use crate::reader::MILLIS_PER_SECOND;

/// Colours handed out to series that do not pick one.
const PALETTE: [&str; 5] = ["blue", "green", "dark-orange", "purple", "brown"];

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    #[serde(default)]
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: &str) -> Self {
        Stroke {
            color: color.to_string(),
            dashed: false,
        }
    }

    pub fn dashed(color: &str) -> Self {
        Stroke {
            color: color.to_string(),
            dashed: true,
        }
    }

    fn for_index(index: usize) -> Self {
        Stroke::solid(PALETTE[index % PALETTE.len()])
    }
}

/// One protocol log and how to weigh it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub path: PathBuf,
    pub label: String,
    /// Multiplier compensating for protocols that emit fewer, heavier blocks.
    #[serde(default = "default_scale")]
    pub scale: u64,
    #[serde(default)]
    pub stroke: Option<Stroke>,
}

fn default_scale() -> u64 {
    1
}

impl SeriesSpec {
    pub fn new<P: Into<PathBuf>>(path: P, label: &str, scale: u64, stroke: Stroke) -> Self {
        SeriesSpec {
            path: path.into(),
            label: label.to_string(),
            scale,
            stroke: Some(stroke),
        }
    }
}

/// `path[:label[:scale]]`, as given on the command line.
impl FromStr for SeriesSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let path = parts.next().unwrap_or_default();
        if path.is_empty() {
            return Err(Error::Config(format!("series {:?} has no path", s)));
        }

        let label = match parts.next() {
            Some(label) if !label.is_empty() => label.to_string(),
            _ => Path::new(path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string()),
        };

        let scale = match parts.next() {
            Some(scale) => scale.parse().map_err(|_| {
                Error::Config(format!("series {:?} has invalid scale {:?}", s, scale))
            })?,
            None => default_scale(),
        };

        Ok(SeriesSpec {
            path: PathBuf::from(path),
            label,
            scale,
            stroke: None,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<SeriesSpec>,
    pub unit_divisor: i64,
    pub timeline_len: usize,
    pub bucket_width_ms: i64,
    pub baseline_value: u64,
    pub baseline_label: String,
    pub baseline_stroke: Stroke,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            title: "Chain growth".to_string(),
            x_label: "time(s)".to_string(),
            y_label: "num of blocks".to_string(),
            series: Vec::new(),
            unit_divisor: MILLIS_PER_SECOND,
            timeline_len: DEFAULT_TIMELINE_LEN,
            bucket_width_ms: DEFAULT_BUCKET_WIDTH_MS,
            baseline_value: 500,
            baseline_label: "epoch size".to_string(),
            baseline_stroke: Stroke::dashed("red"),
        }
    }
}

impl RunConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn preset(name: &str) -> Result<Self> {
        Preset::from_str(name).map(Preset::config)
    }

    /// Stroke for series `index`, falling back to the palette.
    pub fn stroke_for(&self, index: usize) -> Stroke {
        self.series[index]
            .stroke
            .clone()
            .unwrap_or_else(|| Stroke::for_index(index))
    }

    pub fn validate(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(Error::Config("no log series configured".to_string()));
        }
        if self.unit_divisor <= 0 {
            return Err(Error::Config(format!(
                "unit divisor must be positive, got {}",
                self.unit_divisor
            )));
        }
        if self.bucket_width_ms <= 0 {
            return Err(Error::Config(format!(
                "bucket width must be positive, got {}",
                self.bucket_width_ms
            )));
        }
        if self.timeline_len == 0 {
            return Err(Error::Config("timeline must have at least one point".to_string()));
        }
        Ok(())
    }
}

/// The comparisons the simulator experiments were run with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Preset {
    /// Bitcoin alone.
    Bitcoin,
    /// Bitcoin against Minotaur.
    PowGrowth,
    /// Bitcoin, Minotaur and Fruitchains.
    ThreeWay,
}

impl Preset {
    pub const NAMES: [&'static str; 3] = ["bitcoin", "pow-growth", "three-way"];

    pub fn config(self) -> RunConfig {
        match self {
            Preset::Bitcoin => RunConfig {
                title: "Chain growth in Bitcoin".to_string(),
                series: vec![SeriesSpec::new("log.txt", "Bitcoin", 1, Stroke::solid("blue"))],
                ..RunConfig::default()
            },
            Preset::PowGrowth => RunConfig {
                title: "Growth of PoW blocks".to_string(),
                series: vec![
                    SeriesSpec::new("log.txt", "Bitcoin", 1, Stroke::solid("blue")),
                    SeriesSpec::new("log_Minotaur.txt", "Minotaur", 4, Stroke::solid("green")),
                ],
                ..RunConfig::default()
            },
            Preset::ThreeWay => RunConfig {
                title: "Growth of PoW blocks".to_string(),
                series: vec![
                    SeriesSpec::new("log_B.txt", "Bitcoin", 1, Stroke::solid("blue")),
                    SeriesSpec::new("log_M.txt", "Minotaur", 4, Stroke::solid("green")),
                    SeriesSpec::new("log_F.txt", "Fruitchains", 1, Stroke::solid("dark-orange")),
                ],
                baseline_value: 400,
                ..RunConfig::default()
            },
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bitcoin" => Ok(Preset::Bitcoin),
            "pow-growth" => Ok(Preset::PowGrowth),
            "three-way" => Ok(Preset::ThreeWay),
            other => Err(Error::Config(format!(
                "unknown preset {:?}, expected one of {}",
                other,
                Preset::NAMES.join(", ")
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_spec_forms() {
        let full: SeriesSpec = "runs/log_M.txt:Minotaur:4".parse().unwrap();
        assert_eq!(full.path, PathBuf::from("runs/log_M.txt"));
        assert_eq!(full.label, "Minotaur");
        assert_eq!(full.scale, 4);
        assert_eq!(full.stroke, None);

        let bare: SeriesSpec = "log_F.txt".parse().unwrap();
        assert_eq!(bare.label, "log_F");
        assert_eq!(bare.scale, 1);

        let no_label: SeriesSpec = "log.txt::2".parse().unwrap();
        assert_eq!(no_label.label, "log");
        assert_eq!(no_label.scale, 2);
    }

    #[test]
    fn series_spec_errors() {
        assert!(matches!("".parse::<SeriesSpec>(), Err(Error::Config(_))));
        assert!(matches!("log.txt:B:x4".parse::<SeriesSpec>(), Err(Error::Config(_))));
        assert!(matches!("log.txt:B:-1".parse::<SeriesSpec>(), Err(Error::Config(_))));
    }

    #[test]
    fn presets() {
        let bitcoin = RunConfig::preset("bitcoin").unwrap();
        assert_eq!(bitcoin.series.len(), 1);
        assert_eq!(bitcoin.baseline_value, 500);

        let pow = RunConfig::preset("pow-growth").unwrap();
        assert_eq!(pow.series[1].scale, 4);
        assert_eq!(pow.series[1].path, PathBuf::from("log_Minotaur.txt"));

        let three = RunConfig::preset("three-way").unwrap();
        assert_eq!(three.series.len(), 3);
        assert_eq!(three.baseline_value, 400);
        assert_eq!(three.timeline_len, 600);

        for name in Preset::NAMES.iter() {
            assert!(RunConfig::preset(name).unwrap().validate().is_ok());
        }
        assert!(RunConfig::preset("ethereum").is_err());
    }

    #[test]
    fn validation() {
        assert!(RunConfig::default().validate().is_err());

        let mut config = RunConfig::preset("bitcoin").unwrap();
        config.bucket_width_ms = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::preset("bitcoin").unwrap();
        config.timeline_len = 0;
        assert!(config.validate().is_err());

        let mut config = RunConfig::preset("bitcoin").unwrap();
        config.unit_divisor = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn json_fills_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{
                "title": "Growth",
                "series": [
                    { "path": "log_B.txt", "label": "Bitcoin" },
                    { "path": "log_M.txt", "label": "Minotaur", "scale": 4,
                      "stroke": { "color": "green" } }
                ],
                "baseline_value": 400
            }"#,
        )
        .unwrap();
        assert_eq!(config.timeline_len, 600);
        assert_eq!(config.unit_divisor, 1000);
        assert_eq!(config.series[0].scale, 1);
        assert_eq!(config.stroke_for(0), Stroke::solid("blue"));
        assert_eq!(config.stroke_for(1), Stroke::solid("green"));
        assert_eq!(config.baseline_stroke, Stroke::dashed("red"));
    }
}
