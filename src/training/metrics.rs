//! Evaluation metrics for the training tool

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

pub fn accuracy(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Per-class precision/recall/F1 with macro and weighted averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total: usize,
}

impl ClassificationReport {
    pub fn new(y_true: &[String], y_pred: &[String]) -> Self {
        let labels: BTreeSet<&String> = y_true.iter().chain(y_pred.iter()).collect();
        let total = y_true.len();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let pairs = || y_true.iter().zip(y_pred);
                let tp = pairs().filter(|(t, p)| *t == label && *p == label).count();
                let predicted = y_pred.iter().filter(|p| *p == label).count();
                let support = y_true.iter().filter(|t| *t == label).count();

                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label: label.clone(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        let n = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n,
        };

        let weight = total.max(1) as f64;
        let weighted_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision * c.support as f64).sum::<f64>() / weight,
            recall: classes.iter().map(|c| c.recall * c.support as f64).sum::<f64>() / weight,
            f1: classes.iter().map(|c| c.f1 * c.support as f64).sum::<f64>() / weight,
        };

        Self {
            classes,
            accuracy: accuracy(y_true, y_pred),
            macro_avg,
            weighted_avg,
            total,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.label.len())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        writeln!(f, "{:>width$} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>width$} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.total)?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}
