//! Timestamp extraction and origin normalization for simulator logs.
//!
//! A simulator log is loosely formatted text. The only lines that matter are
//! the ones holding a single bare integer (a block timestamp in milliseconds);
//! everything else is chatter and gets skipped. Each log is shifted so its
//! earliest event sits at time zero.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Milliseconds per second, the divisor used by every simulator variant.
pub const MILLIS_PER_SECOND: i64 = 1000;

#[derive(Clone, Copy, Eq, Debug, PartialEq)]
pub enum ParsedLine<'a> {
    Record(i64),
    /// Exactly one token, but not an integer.
    Malformed(&'a str),
    Skipped,
}

pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(token), None) => match parse_integer(token) {
            Some(ms) => ParsedLine::Record(ms),
            None => ParsedLine::Malformed(token),
        },
        _ => ParsedLine::Skipped,
    }
}

/// Optional sign, then digits with single underscores allowed between them (`1_000`).
fn parse_integer(token: &str) -> Option<i64> {
    if !token.contains('_') {
        return token.parse().ok();
    }

    let (sign, digits) = match token.as_bytes()[0] {
        b'+' | b'-' => token.split_at(1),
        _ => ("", token),
    };
    let well_formed = digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.ends_with(|c: char| c.is_ascii_digit())
        && !digits.contains("__")
        && digits.chars().all(|c| c.is_ascii_digit() || c == '_');
    if !well_formed {
        return None;
    }
    format!("{}{}", sign, digits.replace('_', "")).parse().ok()
}

/// Split on `\n`, `\r\n` or a lone `\r`. A trailing terminator does not start a new line.
fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[derive(Default, Clone, Copy, Eq, Debug, PartialEq, Serialize, Deserialize, Add, AddAssign)]
pub struct ParseStats {
    pub lines: usize,
    pub records: usize,
    pub skipped: usize,
}

/// Event times of one log, relative to its earliest event.
///
/// Values keep file order. The minimum is always 0.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Deref)]
pub struct NormalizedSeries {
    #[deref]
    times: Vec<i64>,
    /// Converted value of the earliest record, before shifting.
    origin: i64,
    stats: ParseStats,
}

impl NormalizedSeries {
    /// Shift `units` so the minimum becomes 0.
    fn from_units(mut units: Vec<i64>, stats: ParseStats, source: &Path) -> Result<Self> {
        let origin = match units.iter().min() {
            Some(&min) => min,
            None => {
                return Err(Error::EmptySeries {
                    path: source.to_path_buf(),
                })
            }
        };
        for t in units.iter_mut() {
            *t = t.checked_sub(origin).ok_or_else(|| Error::TimestampRange {
                path: source.to_path_buf(),
            })?;
        }
        Ok(Self {
            times: units,
            origin,
            stats,
        })
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn origin(&self) -> i64 {
        self.origin
    }

    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Normalize again. A no-op for any series built by this module.
    pub fn renormalize(&self) -> Self {
        let shift = self.times.iter().min().copied().unwrap_or(0);
        Self {
            times: self.times.iter().map(|t| t - shift).collect(),
            origin: self.origin + shift,
            stats: self.stats,
        }
    }
}

/// Divide and round to nearest, ties to even, without going through floats.
fn to_units(ms: i64, divisor: i64) -> i64 {
    let quotient = ms.div_euclid(divisor);
    let remainder = ms.rem_euclid(divisor);
    match remainder.cmp(&(divisor - remainder)) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal => quotient + (quotient & 1),
    }
}

fn check_divisor(unit_divisor: i64) -> Result<()> {
    if unit_divisor <= 0 {
        return Err(Error::Config(format!(
            "unit divisor must be positive, got {}",
            unit_divisor
        )));
    }
    Ok(())
}

fn is_gzip(path: &Path) -> bool {
    path.extension().map(|ext| ext == "gz").unwrap_or(false)
}

/// Read a whole log file and normalize its timestamps.
///
/// Files ending in `.gz` are decompressed on the fly. The file handle is
/// dropped as soon as the last line has been read.
pub fn normalize<P: AsRef<Path>>(path: P, unit_divisor: i64) -> Result<NormalizedSeries> {
    let path = path.as_ref();
    check_divisor(unit_divisor)?;

    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let series = if is_gzip(path) {
        normalize_reader(BufReader::new(GzDecoder::new(file)), path, unit_divisor)?
    } else {
        normalize_reader(BufReader::new(file), path, unit_divisor)?
    };

    debug!(
        "{}: {} records, {} skipped lines",
        path.display(),
        series.stats.records,
        series.stats.skipped
    );
    Ok(series)
}

/// Same as [`normalize`], for any byte source. `source` only labels errors.
pub fn normalize_reader<R: Read>(
    mut reader: R,
    source: &Path,
    unit_divisor: i64,
) -> Result<NormalizedSeries> {
    check_divisor(unit_divisor)?;

    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| Error::Io {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut stats = ParseStats::default();
    let mut units = Vec::new();
    for (index, line) in split_lines(&text).into_iter().enumerate() {
        stats.lines += 1;

        match parse_line(line) {
            ParsedLine::Record(ms) => {
                units.push(to_units(ms, unit_divisor));
                stats.records += 1;
            }
            ParsedLine::Skipped => stats.skipped += 1,
            ParsedLine::Malformed(token) => {
                return Err(Error::MalformedToken {
                    path: source.to_path_buf(),
                    line: index + 1,
                    token: token.to_string(),
                });
            }
        }
    }

    NormalizedSeries::from_units(units, stats, source)
}

/// Normalize raw millisecond values already in memory.
pub fn normalize_values<I>(values: I, unit_divisor: i64) -> Result<NormalizedSeries>
where
    I: IntoIterator<Item = i64>,
{
    check_divisor(unit_divisor)?;

    let units: Vec<i64> = values
        .into_iter()
        .map(|ms| to_units(ms, unit_divisor))
        .collect();
    let stats = ParseStats {
        lines: units.len(),
        records: units.len(),
        skipped: 0,
    };
    NormalizedSeries::from_units(units, stats, Path::new("<values>"))
}
