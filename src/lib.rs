extern crate serde;
extern crate serde_json;
extern crate rayon;
#[macro_use]
extern crate derive_more;

pub mod config;
pub mod error;
pub mod export;
pub mod growth;
pub mod pipeline;
pub mod reader;
pub mod render;

pub use crate::config::{RunConfig, SeriesSpec, Stroke};
pub use crate::error::{Error, Result};
pub use crate::growth::{aggregate, baseline, GrowthSeries, Timeline};
pub use crate::pipeline::{run, GrowthChart};
pub use crate::reader::{normalize, NormalizedSeries};
