use std::io::Write;

use car_purchase_ml::data_loader::load_data;
use car_purchase_ml::inference::predict_new_data;
use car_purchase_ml::pipeline::{evaluate_models, prepare_data, train_models};
use car_purchase_ml::{
    load_artifact, run_pipeline, save_artifact, Estimator, ModelArtifact, ModelKind, PipelineConfig,
    PipelineError,
};
use tempfile::{tempdir, NamedTempFile, TempDir};

const GENDER: [f64; 10] = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0];
const AGE: [f64; 10] = [41.0, 29.0, 53.0, 35.0, 47.0, 62.0, 26.0, 38.0, 58.0, 44.0];
const SALARY: [f64; 10] = [
    42000.0, 55500.0, 61200.0, 48300.0, 72900.0, 39800.0, 66400.0, 51700.0, 80100.0, 45600.0,
];
const DEBT: [f64; 10] = [
    11600.0, 9570.0, 3200.0, 14800.0, 7300.0, 12100.0, 5600.0, 10400.0, 2900.0, 8800.0,
];
const NET_WORTH: [f64; 10] = [
    238961.0, 530973.0, 312450.0, 187200.0, 455800.0, 601300.0, 150900.0, 389700.0, 274100.0,
    498600.0,
];

fn purchase_amount(salary: f64) -> f64 {
    0.55 * salary + 1500.0
}

/// 10 строк, сумма покупки линейно зависит от зарплаты
fn write_dataset() -> NamedTempFile {
    write_dataset_with_gender(&GENDER)
}

fn write_dataset_with_gender(gender: &[f64; 10]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Customer Name,Customer e-mail,Country,Gender,Age,Annual Salary,Credit Card Debt,Net Worth,Car Purchase Amount"
    )
    .unwrap();
    for i in 0..10 {
        writeln!(
            file,
            "Customer {i},customer{i}@example.com,Norway,{},{},{},{},{},{}",
            gender[i],
            AGE[i],
            SALARY[i],
            DEBT[i],
            NET_WORTH[i],
            purchase_amount(SALARY[i])
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}

fn config(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        model_path: dir.path().join("car_model.json"),
        output_dir: dir.path().join("plots"),
        plots: false,
        ..PipelineConfig::default()
    }
}

#[test]
fn linear_model_wins_on_linear_data() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let config = config(&dir);

    let data = load_data(file.path()).unwrap();
    let report = run_pipeline(&data, &config).unwrap();

    let order: Vec<ModelKind> = report.scores.iter().map(|s| s.kind).collect();
    assert_eq!(order, ModelKind::ALL.to_vec());

    let linear = report.scores[0];
    assert!(linear.rmse < 1e-6, "linear rmse {}", linear.rmse);
    assert!(report.scores[1..].iter().all(|s| s.rmse > linear.rmse));
    assert_eq!(report.best, ModelKind::LinearRegression);

    assert!(config.model_path.exists());
    let expected = purchase_amount(config.inference_row[2]);
    assert!(
        (report.prediction - expected).abs() < 1e-3,
        "prediction {} expected {}",
        report.prediction,
        expected
    );
}

#[test]
fn saved_model_predicts_identically_after_reload() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let config = config(&dir);

    let data = load_data(file.path()).unwrap();
    let prepared = prepare_data(&data, &config).unwrap();
    let models = train_models(&prepared.X_train, &prepared.y_train).unwrap();

    for model in models {
        let kind = model.kind();
        let before = model.predict(&prepared.X_test).unwrap();

        let artifact = ModelArtifact {
            kind,
            rmse: 0.0,
            model,
            feature_scaler: prepared.feature_scaler.clone(),
            target_scaler: prepared.target_scaler.clone(),
        };
        let path = dir.path().join(format!("{kind:?}.json"));
        save_artifact(&path, &artifact).unwrap();

        let loaded = load_artifact(&path).unwrap();
        assert_eq!(loaded.kind, kind);
        assert_eq!(loaded.feature_scaler, prepared.feature_scaler);
        assert_eq!(loaded.model.predict(&prepared.X_test).unwrap(), before, "{kind}");
    }
}

#[test]
fn evaluation_is_reproducible() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let data = load_data(file.path()).unwrap();

    let run = || {
        let prepared = prepare_data(&data, &config).unwrap();
        let models = train_models(&prepared.X_train, &prepared.y_train).unwrap();
        evaluate_models(&models, &prepared.X_test, &prepared.y_test)
            .unwrap()
            .into_iter()
            .map(|e| e.score.rmse)
            .collect::<Vec<f64>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn scalers_follow_the_split_policy() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let data = load_data(file.path()).unwrap();

    let leaky = PipelineConfig {
        scale_before_split: true,
        ..config(&dir)
    };
    let prepared = prepare_data(&data, &leaky).unwrap();
    assert_eq!(prepared.feature_scaler.data_min().unwrap()[2], 39800.0);
    assert_eq!(prepared.feature_scaler.data_max().unwrap()[2], 80100.0);

    // По умолчанию скейлеры видят только train: обучающие признаки строго в [0, 1]
    let clean = prepare_data(&data, &config(&dir)).unwrap();
    assert!(clean.X_train.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert_eq!(clean.X_train.nrows(), 8);
    assert_eq!(clean.X_test.nrows(), 2);
}

#[test]
fn inference_rejects_wrong_row_width() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let data = load_data(file.path()).unwrap();
    run_pipeline(&data, &config).unwrap();

    let artifact = load_artifact(&config.model_path).unwrap();
    let err = predict_new_data(&artifact, &[0.0, 42.0, 62812.09]).unwrap_err();
    assert!(matches!(err, PipelineError::ShapeMismatch { expected: 5, actual: 3 }));
}

#[test]
fn plots_are_written_when_enabled() {
    let file = write_dataset();
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        plots: true,
        ..config(&dir)
    };
    let data = load_data(file.path()).unwrap();
    let report = run_pipeline(&data, &config).unwrap();

    assert_eq!(report.plots.len(), 2);
    assert!(report.plots.iter().all(|p| p.exists()));
}

#[test]
fn single_gender_dataset_runs_end_to_end() {
    let file = write_dataset_with_gender(&[0.0; 10]);
    let dir = tempdir().unwrap();
    let config = config(&dir);
    let data = load_data(file.path()).unwrap();

    let report = run_pipeline(&data, &config).unwrap();
    assert_eq!(report.scores.len(), ModelKind::ALL.len());
    assert!(report.scores.iter().all(|s| s.rmse.is_finite()));
    assert_eq!(report.best, ModelKind::LinearRegression);

    let expected = purchase_amount(config.inference_row[2]);
    assert!((report.prediction - expected).abs() < 1e-3);
}
