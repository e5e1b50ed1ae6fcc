//! Reads every configured log and turns it into an aligned growth chart.

use chrono::{TimeZone, Utc};
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{RunConfig, Stroke};
use crate::error::{Error, Result};
use crate::growth::{aggregate, baseline, GrowthSeries, Timeline};
use crate::reader::{normalize, NormalizedSeries, ParseStats, MILLIS_PER_SECOND};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub label: String,
    pub stroke: Stroke,
    pub values: GrowthSeries,
}

/// Everything the renderer needs, all series the same length as `timeline`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GrowthChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub timeline: Timeline,
    pub curves: Vec<Curve>,
    pub baseline: Curve,
}

impl GrowthChart {
    /// Every curve and the baseline must have one value per timeline point.
    pub fn check_aligned(&self) -> Result<()> {
        let expected = self.timeline.len();
        for curve in self.curves.iter().chain(std::iter::once(&self.baseline)) {
            if curve.values.len() != expected {
                return Err(Error::Misaligned {
                    label: curve.label.clone(),
                    len: curve.values.len(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

/// Parse all logs, then aggregate. Fails as a whole on the first bad log.
pub fn run(config: &RunConfig) -> Result<GrowthChart> {
    config.validate()?;

    // Every file is read before any error is surfaced, so the reported failure
    // is the first one in configuration order, not the first thread to fail.
    let outcomes: Vec<Result<NormalizedSeries>> = config
        .series
        .par_iter()
        .map(|spec| normalize(&spec.path, config.unit_divisor))
        .collect();
    let series = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

    let mut total = ParseStats::default();
    for (spec, normalized) in config.series.iter().zip(series.iter()) {
        let stats = normalized.stats();
        total += stats;
        info!(
            "{} ({}): {} blocks, {} skipped lines, origin {}",
            spec.label,
            spec.path.display(),
            stats.records,
            stats.skipped,
            describe_origin(normalized.origin(), config.unit_divisor)
        );
    }
    info!(
        "Parsed {} records from {} lines across {} logs",
        total.records,
        total.lines,
        series.len()
    );

    chart_from_series(config, &series)
}

/// Aggregate already-normalized series, one per configured log, in order.
pub fn chart_from_series(config: &RunConfig, series: &[NormalizedSeries]) -> Result<GrowthChart> {
    if series.len() != config.series.len() {
        return Err(Error::Config(format!(
            "{} series configured but {} supplied",
            config.series.len(),
            series.len()
        )));
    }

    let timeline = Timeline::new(config.timeline_len);
    let curves = config
        .series
        .iter()
        .zip(series.iter())
        .enumerate()
        .map(|(index, (spec, normalized))| Curve {
            label: spec.label.clone(),
            stroke: config.stroke_for(index),
            values: aggregate(
                normalized.times(),
                spec.scale,
                &timeline,
                config.bucket_width_ms,
            ),
        })
        .collect();

    let reference = Curve {
        label: config.baseline_label.clone(),
        stroke: config.baseline_stroke.clone(),
        values: baseline(config.baseline_value, &timeline),
    };

    Ok(GrowthChart {
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        timeline,
        curves,
        baseline: reference,
    })
}

/// 2000-01-01 and 2100-01-01, in Unix seconds.
const PLAUSIBLE_EPOCH_SECONDS: std::ops::Range<i64> = 946_684_800..4_102_444_800;

/// Human-readable origin, when the log used seconds since the Unix epoch.
fn describe_origin(origin: i64, unit_divisor: i64) -> String {
    if unit_divisor != MILLIS_PER_SECOND || !PLAUSIBLE_EPOCH_SECONDS.contains(&origin) {
        return origin.to_string();
    }
    match Utc.timestamp_opt(origin, 0).single() {
        Some(at) => format!("{} ({})", origin, at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => origin.to_string(),
    }
}
