//! Training pipeline tests

use super::*;
use crate::features::encode_payload;
use crate::model::{store, ProbabilisticClassifier};
use crate::test_support::{as_map, bike_payload, bootstrap_model, bus_payload};

fn snapshot(model: &crate::model::RandomForest) -> serde_json::Value {
    serde_json::to_value(model).unwrap()
}

fn quick_options(persist: bool) -> BootstrapOptions {
    BootstrapOptions {
        seed: 42,
        n_estimators: 5,
        persist,
    }
}

#[test]
fn test_bootstrap_model_uses_coarse_categories() {
    let model = bootstrap_model();
    let categories: Vec<&str> = VehicleCategory::ALL.iter().map(|c| c.as_str()).collect();

    assert!(model.classes().iter().all(|c| categories.contains(&c.as_str())));
    for common in ["Bus", "Car", "Truck"] {
        assert!(model.classes().iter().any(|c| c == common), "missing {}", common);
    }
    assert_eq!(model.n_estimators(), BOOTSTRAP_TREES);
}

#[test]
fn test_bootstrap_bus() {
    let model = bootstrap_model();
    let vector = encode_payload(&as_map(bus_payload())).unwrap();

    assert_eq!(model.predict(&vector).unwrap(), "Bus");
}

#[test]
fn test_bootstrap_bike() {
    let model = bootstrap_model();
    let vector = encode_payload(&as_map(bike_payload())).unwrap();
    let label = model.predict(&vector).unwrap();
    let proba = model.predict_proba(&vector).unwrap();

    assert!(model.classes().contains(&label));
    assert!(category_of(&label).is_some());
    assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn test_bootstrap_is_reproducible() {
    let a = fit_bootstrap_model(7, 3).unwrap();
    let b = fit_bootstrap_model(7, 3).unwrap();
    assert_eq!(snapshot(&a), snapshot(&b));
}

#[test]
fn test_held_out_accuracy() {
    let catalog = vehicle_catalog();
    let samples = generate_seeded(&catalog, samples_per_class(2000, catalog.len()), 42).unwrap();
    let (train, test) = train_test_split(&samples, 0.2, 42).unwrap();

    let (x, y) = split_xy(&train);
    let params = crate::model::ForestParams {
        n_estimators: 20,
        max_depth: Some(15),
        min_samples_split: 5,
        min_samples_leaf: 2,
        ..Default::default()
    };
    let model = crate::model::RandomForest::fit(&x, &y, params).unwrap();
    let report = evaluate(&model, &test).unwrap();

    assert_eq!(report.total, test.len());
    // Several catalog classes overlap heavily, so exact labels are hard;
    // the forest should still beat chance by a wide margin.
    assert!(report.accuracy > 0.5, "accuracy {}", report.accuracy);
}

#[test]
fn test_load_or_bootstrap_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model").join("vehicle_model.json");

    let first = load_or_bootstrap(&path, &quick_options(true)).unwrap();
    assert_eq!(first.source, ModelSource::Bootstrap);
    assert!(path.exists());

    let second = load_or_bootstrap(&path, &quick_options(true)).unwrap();
    assert_eq!(second.source, ModelSource::File(path.clone()));
    assert_eq!(snapshot(&second.model), snapshot(&first.model));
}

#[test]
fn test_load_or_bootstrap_without_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicle_model.json");

    let loaded = load_or_bootstrap(&path, &quick_options(false)).unwrap();

    assert_eq!(loaded.source, ModelSource::Bootstrap);
    assert!(!path.exists());
}

#[test]
fn test_load_or_bootstrap_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicle_model.json");
    std::fs::write(&path, "not a model").unwrap();

    let loaded = load_or_bootstrap(&path, &quick_options(false)).unwrap();

    assert_eq!(loaded.source, ModelSource::Bootstrap);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "not a model");
}

#[test]
fn test_load_or_bootstrap_prefers_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vehicle_model.json");
    let saved = fit_bootstrap_model(1, 2).unwrap();
    store::save(&saved, &path).unwrap();

    let loaded = load_or_bootstrap(&path, &quick_options(true)).unwrap();

    assert_eq!(loaded.source, ModelSource::File(path.clone()));
    assert_eq!(snapshot(&loaded.model), snapshot(&saved));
}

#[test]
fn test_evaluate_counts_every_sample() {
    let catalog = vehicle_catalog();
    let samples = generate_seeded(&catalog, 3, 9).unwrap();
    let report = evaluate(bootstrap_model(), &samples).unwrap();

    assert_eq!(report.total, samples.len());
    assert!((0.0..=1.0).contains(&report.accuracy));
}
