//! Draws a [`GrowthChart`] with gnuplot.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use gnuplot::{
    AlignBottom, AlignRight, AxesCommon, Caption, Color, Coordinate::Graph, Dash, Figure,
    LineStyle, LineWidth, Placement, Solid,
};
use log::info;

use crate::config::Stroke;
use crate::error::{Error, Result};

const GNUPLOT: &str = "gnuplot";
use crate::pipeline::{Curve, GrowthChart};

pub enum Output<'a> {
    /// Interactive gnuplot window.
    Window,
    Png {
        path: &'a Path,
        width: u32,
        height: u32,
    },
}

fn build_figure(chart: &GrowthChart) -> Figure {
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title(&chart.title, &[])
            .set_x_label(&chart.x_label, &[])
            .set_y_label(&chart.y_label, &[])
            .set_legend(Graph(1.0), Graph(0.0), &[Placement(AlignRight, AlignBottom)], &[]);

        for curve in chart.curves.iter().chain(std::iter::once(&chart.baseline)) {
            draw_curve(axes, chart.timeline.points(), curve);
        }
    }
    fg
}

fn draw_curve(axes: &mut gnuplot::Axes2D, x: &[i64], curve: &Curve) {
    let Stroke { color, dashed } = &curve.stroke;
    axes.lines(
        x.iter().copied(),
        curve.values.iter().copied(),
        &[
            Caption(curve.label.as_str()),
            Color(color.as_str()),
            LineStyle(if *dashed { Dash } else { Solid }),
            LineWidth(1.5),
        ],
    );
}

pub fn render(chart: &GrowthChart, output: Output) -> Result<()> {
    render_with(chart, output, GNUPLOT)
}

fn render_with(chart: &GrowthChart, output: Output, program: &str) -> Result<()> {
    chart.check_aligned()?;

    let mut fg = build_figure(chart);
    match output {
        Output::Window => {
            info!("Showing \"{}\" in a gnuplot window", chart.title);
        }
        Output::Png {
            path,
            width,
            height,
        } => {
            let target = path.to_str().ok_or_else(|| {
                Error::Render(format!("output path {} is not valid UTF-8", path.display()))
            })?;
            fg.set_terminal(&format!("pngcairo size {},{}", width, height), target);
            info!("Writing \"{}\" to {}", chart.title, path.display());
        }
    }

    let mut commands = Vec::new();
    fg.echo(&mut commands);
    pipe_script(&commands, program)
}

/// Run `program -p` with `commands` on stdin and wait for it to exit.
fn pipe_script(commands: &[u8], program: &str) -> Result<()> {
    let mut child = Command::new(program)
        .arg("-p")
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| Error::Render(format!("could not start {}: {}", program, e)))?;

    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(commands),
        None => Ok(()),
    };
    let status = child
        .wait()
        .map_err(|e| Error::Render(format!("{} did not finish: {}", program, e)))?;
    written.map_err(|e| Error::Render(format!("could not send plot to {}: {}", program, e)))?;

    if !status.success() {
        return Err(Error::Render(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

/// The gnuplot script for `chart`, without running gnuplot.
pub fn script(chart: &GrowthChart) -> Vec<u8> {
    let fg = build_figure(chart);
    let mut out = Vec::new();
    fg.echo(&mut out);
    out
}
