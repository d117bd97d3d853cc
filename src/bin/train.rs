//! Offline training tool
//!
//! Generates the synthetic catalog, fits a forest on a stratified split,
//! prints the evaluation report and writes the model file the server loads.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vehicle_classifier::features::FeatureVector;
use vehicle_classifier::model::{
    classifier::max_probability, store, Classifier, ForestParams, ProbabilisticClassifier,
    RandomForest,
};
use vehicle_classifier::training::{
    category_of, evaluate, generate_seeded, samples_per_class, split_xy, train_test_split,
    vehicle_catalog,
};

#[derive(Parser)]
#[command(name = "train")]
#[command(about = "Train the vehicle classification model", long_about = None)]
struct Args {
    /// Total synthetic samples, split evenly across classes
    #[arg(long, default_value_t = 2000)]
    samples: usize,

    /// Seed for data generation, splitting and the forest
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of each class held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// Number of trees
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Maximum tree depth (0 = unlimited)
    #[arg(long, default_value_t = 15)]
    max_depth: usize,

    #[arg(long, default_value_t = 5)]
    min_samples_split: usize,

    #[arg(long, default_value_t = 2)]
    min_samples_leaf: usize,

    /// Model file to write
    #[arg(short, long, default_value = "model/vehicle_model.json")]
    output: PathBuf,
}

/// Sample vehicles and the category each should land in
const SAMPLE_VEHICLES: [([f64; 12], &str); 5] = [
    ([2.0, 1.1, 0.8, 200.0, 150.0, 180.0, 2.0, 1.0, 0.0, 0.0, 0.0, 1.0], "Bike"),
    ([4.5, 1.5, 1.9, 1500.0, 150.0, 180.0, 2.0, 5.0, 0.0, 0.0, 0.0, 1.0], "Car"),
    ([5.2, 1.9, 2.1, 2200.0, 250.0, 200.0, 2.0, 7.0, 1.0, 0.0, 0.0, 0.0], "SUV"),
    ([12.0, 3.2, 2.5, 15000.0, 350.0, 100.0, 3.0, 50.0, 1.0, 0.0, 0.0, 0.0], "Bus"),
    ([8.5, 3.0, 2.4, 12000.0, 400.0, 120.0, 4.0, 2.0, 1.0, 0.0, 0.0, 0.0], "Truck"),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "vehicle_classifier=info,train=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Generate data
    tracing::info!("Generating synthetic vehicle data...");
    let catalog = vehicle_catalog();
    let per_class = samples_per_class(args.samples, catalog.len());
    let samples = generate_seeded(&catalog, per_class, args.seed)
        .context("Failed to generate synthetic data")?;

    let (train, test) = train_test_split(&samples, args.test_size, args.seed)
        .context("Failed to split data")?;

    tracing::info!("Training set size: {}", train.len());
    tracing::info!("Test set size: {}", test.len());
    tracing::info!("Classes: {:?}", catalog.iter().map(|c| c.label.as_str()).collect::<Vec<_>>());

    // Fit
    let params = ForestParams {
        n_estimators: args.trees,
        max_depth: (args.max_depth > 0).then_some(args.max_depth),
        min_samples_split: args.min_samples_split,
        min_samples_leaf: args.min_samples_leaf,
        bootstrap: true,
        seed: args.seed,
    };

    tracing::info!("Training Random Forest model ({} trees)...", params.n_estimators);
    let (x, y) = split_xy(&train);
    let model = RandomForest::fit(&x, &y, params).context("Failed to fit model")?;

    // Evaluate
    let report = evaluate(&model, &test).context("Failed to evaluate model")?;
    println!("Model Accuracy: {:.3}", report.accuracy);
    println!("\nClassification Report:");
    println!("{}", report);

    store::save(&model, &args.output)
        .with_context(|| format!("Failed to save model to {}", args.output.display()))?;
    println!("Model saved as '{}'", args.output.display());

    print_sample_predictions(&model)?;

    Ok(())
}

fn print_sample_predictions(model: &RandomForest) -> anyhow::Result<()> {
    println!("\nTesting model with sample data...");

    for (values, expected) in SAMPLE_VEHICLES {
        let features = FeatureVector::from_values(values);
        let label = model.predict(&features)?;
        let confidence = max_probability(&model.predict_proba(&features)?).unwrap_or(0.0);
        let category = category_of(&label).map(|c| c.as_str()).unwrap_or("?");

        println!(
            "Expected: {:5} | Predicted: {:5} ({}) | Confidence: {:.2}",
            expected, category, label, confidence
        );
    }

    Ok(())
}
