/// Точка входа: анализ датасета, сравнение моделей, сохранение лучшей и прогноз

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use car_purchase_ml::{
    comparison::{compare_linear_models, plot_comparison},
    data_loader::load_data,
    pipeline::run_pipeline,
    summary::{format_records, summarize},
    PipelineConfig,
};

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(&path).with_context(|| format!("loading config {path}"))?,
        None => PipelineConfig::default(),
    };
    tracing::debug!(?config, "Config resolved");

    let data = load_data(&config.data_path)
        .with_context(|| format!("loading dataset {}", config.data_path.display()))?;
    tracing::info!("Dataset loaded: {} rows", data.len());

    println!("First {} rows:", config.summary_rows);
    println!("{}", format_records(data.head(config.summary_rows)));
    println!("\nLast {} rows:", config.summary_rows);
    println!("{}", format_records(data.tail(config.summary_rows)));
    println!();
    println!("{}", summarize(&data));

    let report = run_pipeline(&data, &config).context("model comparison failed")?;

    println!("Model RMSE (scaled target):");
    for score in &report.scores {
        println!("{:<30}{:>12.5}", score.kind.name(), score.rmse);
    }
    println!("\nBest model: {} -> {}", report.best, report.model_path.display());
    println!("Predicted output: {:.2}", report.prediction);

    if config.run_comparison {
        let results = compare_linear_models(&data, &config).context("linear-family comparison failed")?;
        println!("\nLinear-family MSE (Gender, Age, Annual Salary):");
        for r in &results {
            println!("{:<34}{:>18.2}", r.variant.title(), r.mse);
        }

        if config.plots {
            let path = config.output_dir.join("regression_comparisons.svg");
            plot_comparison(&results, &path)?;
            tracing::info!("Comparison plot written to {}", path.display());
        }
    }

    for plot in &report.plots {
        tracing::info!("Plot written to {}", plot.display());
    }

    Ok(())
}
