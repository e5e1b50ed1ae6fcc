//! Plain-data dumps of a chart for use outside gnuplot.

use std::io::Write;

use crate::error::Result;
use crate::pipeline::GrowthChart;

/// One row per timeline point: `time`, each curve, then the baseline.
pub fn write_csv<W: Write>(chart: &GrowthChart, writer: W) -> Result<()> {
    chart.check_aligned()?;
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["time".to_string()];
    header.extend(chart.curves.iter().map(|curve| curve.label.clone()));
    header.push(chart.baseline.label.clone());
    wtr.write_record(&header)?;

    for (index, point) in chart.timeline.points().iter().enumerate() {
        let mut row = Vec::with_capacity(header.len());
        row.push(point.to_string());
        for curve in chart.curves.iter().chain(std::iter::once(&chart.baseline)) {
            row.push(curve.values[index].to_string());
        }
        wtr.write_record(&row)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_json<W: Write>(chart: &GrowthChart, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, chart)?;
    Ok(())
}
