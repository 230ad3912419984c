//! SVG-графики: столбцы RMSE и диаграммы рассеяния "истина / предсказание"

use std::path::Path;

use ndarray::Array1;
use plotters::prelude::*;

use crate::error::{PipelineError, Result};
use crate::pipeline::ModelScore;

pub struct ScatterPanel<'a> {
    pub title: String,
    pub y_true: &'a Array1<f64>,
    pub y_pred: &'a Array1<f64>,
}

fn plot_err<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Plot(e.to_string())
}

pub fn plot_model_performance(scores: &[ModelScore], path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let max = scores.iter().map(|s| s.rmse).fold(0.0_f64, f64::max);
    let top = if max > 0.0 { max * 1.15 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption("Model RMSE Comparison", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0..scores.len()).into_segmented(), 0.0..top)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Models")
        .y_desc("Root Mean Squared Error (RMSE)")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => scores
                .get(*i)
                .map(|s| s.kind.name().to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(plot_err)?;

    let palette = [BLUE, GREEN, RED, MAGENTA, RGBColor(255, 165, 0)];
    chart
        .draw_series(scores.iter().enumerate().map(|(i, s)| {
            let color = palette[i % palette.len()];
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), s.rmse)],
                color.filled(),
            );
            bar.set_margin(0, 0, 20, 20);
            bar
        }))
        .map_err(plot_err)?;

    // Подписи значений над столбцами
    chart
        .draw_series(scores.iter().enumerate().map(|(i, s)| {
            Text::new(
                format!("{:.5}", s.rmse),
                (SegmentValue::CenterOf(i), s.rmse + top * 0.01),
                ("sans-serif", 14).into_font(),
            )
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Сетка по 3 панели в ряд, общий заголовок
pub fn plot_predictions(panels: &[ScatterPanel<'_>], title: &str, path: &Path) -> Result<()> {
    let cols = 3;
    let rows = panels.len().div_ceil(cols).max(1);

    let root = SVGBackend::new(path, (1500, 500 * rows as u32)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;
    let root = root.titled(title, ("sans-serif", 30)).map_err(plot_err)?;

    for (area, panel) in root.split_evenly((rows, cols)).iter().zip(panels) {
        let (lo, hi) = bounds(panel.y_true, panel.y_pred);

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(lo..hi, lo..hi)
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("True Values")
            .y_desc("Predicted Values")
            .draw()
            .map_err(plot_err)?;

        chart
            .draw_series(
                panel
                    .y_true
                    .iter()
                    .zip(panel.y_pred.iter())
                    .map(|(&t, &p)| Circle::new((t, p), 3, BLUE.filled())),
            )
            .map_err(plot_err)?;
    }

    root.present().map_err(plot_err)?;
    Ok(())
}

fn bounds(a: &Array1<f64>, b: &Array1<f64>) -> (f64, f64) {
    let (lo, hi) = a
        .iter()
        .chain(b.iter())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1e-6);
    (lo - pad, hi + pad)
}
