//! Random Forest Classifier
//!
//! Bagged `linfa-trees` decision trees (Gini impurity). Each tree is fitted
//! on its own bootstrap sample; the forest predicts by majority vote and
//! reports the vote shares as class probabilities.
//!
//! Determinism:
//! - every tree gets its own seed drawn from the forest seed up front, so
//!   parallel fitting gives the same forest regardless of scheduling
//! - probabilities are vote counts over the tree count, so they are
//!   bit-identical after a save/load round trip

use std::collections::BTreeSet;

use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, FEATURE_COUNT};
use super::classifier::{Classifier, ClassifierError, ProbabilisticClassifier};

pub const MODEL_TYPE: &str = "RandomForestClassifier";

/// Trees predict class indices into `RandomForest::classes`
pub type ClassTree = DecisionTree<f64, usize>;

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    /// `None` grows until leaves are pure or too small to split
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.n_estimators == 0 {
            return Err(ClassifierError::InvalidParams("n_estimators must be >= 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ClassifierError::InvalidParams("min_samples_split must be >= 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ClassifierError::InvalidParams("min_samples_leaf must be >= 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(ClassifierError::InvalidParams("max_depth must be >= 1".into()));
        }
        Ok(())
    }

    /// Every sample carries unit weight, so sample counts map onto weights
    fn fit_tree(&self, records: Array2<f64>, targets: Array1<usize>) -> Result<ClassTree, ClassifierError> {
        let dataset = Dataset::new(records, targets);

        DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(self.max_depth)
            .min_weight_split(self.min_samples_split as f32)
            .min_weight_leaf(self.min_samples_leaf as f32)
            .fit(&dataset)
            .map_err(|e| ClassifierError::Internal(format!("tree fit failed: {}", e)))
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    /// Sorted, deduplicated labels
    classes: Vec<String>,
    params: ForestParams,
    trees: Vec<ClassTree>,
}

impl RandomForest {
    pub fn fit(
        x: &[FeatureVector],
        labels: &[String],
        params: ForestParams,
    ) -> Result<Self, ClassifierError> {
        params.validate()?;

        if x.is_empty() {
            return Err(ClassifierError::EmptyTrainingSet);
        }
        if x.len() != labels.len() {
            return Err(ClassifierError::LabelCountMismatch {
                samples: x.len(),
                labels: labels.len(),
            });
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let y: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let mut master = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.gen()).collect();

        let n = x.len();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };

                let records = Array2::from_shape_fn((samples.len(), FEATURE_COUNT), |(i, j)| {
                    x[samples[i]].values[j]
                });
                let targets: Array1<usize> = samples.iter().map(|&s| y[s]).collect();

                params.fit_tree(records, targets)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Fitted {} trees on {} samples ({} classes)",
            trees.len(),
            n,
            classes.len()
        );

        Ok(Self { classes, params, trees })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[ClassTree] {
        &self.trees
    }

    /// Structural checks for forests read back from disk
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.classes.is_empty() {
            return Err(ClassifierError::Internal("forest has no classes".into()));
        }
        if self.trees.is_empty() {
            return Err(ClassifierError::Internal("forest has no trees".into()));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ClassifierError::Internal("forest classes are not sorted".into()));
        }

        let n_classes = self.classes.len();
        for (i, tree) in self.trees.iter().enumerate() {
            let out_of_range = tree
                .iter_nodes()
                .filter_map(|node| node.prediction())
                .any(|class| class >= n_classes);
            if out_of_range {
                return Err(ClassifierError::Internal(format!(
                    "tree {} predicts an unknown class",
                    i
                )));
            }
        }

        Ok(())
    }

    fn votes(&self, features: &FeatureVector) -> Result<Vec<u32>, ClassifierError> {
        let record = Array2::from_shape_vec((1, FEATURE_COUNT), features.values.to_vec())
            .map_err(|e| ClassifierError::Internal(e.to_string()))?;

        let mut votes = vec![0u32; self.classes.len()];
        for tree in &self.trees {
            let predicted: Array1<usize> = tree.predict(&record);
            let class = predicted
                .first()
                .copied()
                .ok_or_else(|| ClassifierError::Internal("tree returned no prediction".into()))?;
            let slot = votes
                .get_mut(class)
                .ok_or_else(|| ClassifierError::Internal(format!("tree predicted unknown class {}", class)))?;
            *slot += 1;
        }

        Ok(votes)
    }
}

impl Classifier for RandomForest {
    fn model_type(&self) -> &str {
        MODEL_TYPE
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let votes = self.votes(features)?;

        // First index wins ties
        let mut best = 0;
        for (i, &v) in votes.iter().enumerate() {
            if v > votes[best] {
                best = i;
            }
        }

        self.classes
            .get(best)
            .cloned()
            .ok_or_else(|| ClassifierError::Internal("forest has no classes".into()))
    }
}

impl ProbabilisticClassifier for RandomForest {
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ClassifierError> {
        let votes = self.votes(features)?;
        let n_trees = self.trees.len() as f64;
        Ok(votes.into_iter().map(|v| v as f64 / n_trees).collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
