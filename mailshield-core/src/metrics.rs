//! Evaluation of predicted labels against gold labels.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Fraction of positions where `predicted` equals `gold`.
pub fn accuracy(gold: &[String], predicted: &[String]) -> f64 {
    if gold.is_empty() {
        return 0.0;
    }
    let hits = gold.iter().zip(predicted).filter(|(g, p)| g == p).count();
    hits as f64 / gold.len() as f64
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of gold rows with this label
    pub support: usize,
}

/// Per-class precision, recall and F1, plus accuracy and averages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_f1: f64,
    pub weighted_f1: f64,
    pub total: usize,
}

impl ClassificationReport {
    pub fn new(gold: &[String], predicted: &[String]) -> Self {
        let labels: BTreeSet<&String> = gold.iter().chain(predicted).collect();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let mut tp = 0usize;
                let mut fp = 0usize;
                let mut fn_ = 0usize;
                for (g, p) in gold.iter().zip(predicted) {
                    match (g == label, p == label) {
                        (true, true) => tp += 1,
                        (false, true) => fp += 1,
                        (true, false) => fn_ += 1,
                        (false, false) => {}
                    }
                }
                let precision = safe_div(tp, tp + fp);
                let recall = safe_div(tp, tp + fn_);
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
                    support: tp + fn_,
                }
            })
            .collect();

        let total = gold.len();
        let macro_f1 = if classes.is_empty() {
            0.0
        } else {
            classes.iter().map(|c| c.f1).sum::<f64>() / classes.len() as f64
        };
        let weighted_f1 = if total == 0 {
            0.0
        } else {
            classes.iter().map(|c| c.f1 * c.support as f64).sum::<f64>() / total as f64
        };

        Self {
            classes,
            accuracy: accuracy(gold, predicted),
            macro_f1,
            weighted_f1,
            total,
        }
    }
}

fn safe_div(num: usize, den: usize) -> f64 {
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
            .max()
            .unwrap_or(0)
            .max("weighted avg".len());

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "macro avg", "", "", self.macro_f1, self.total
        )?;
        write!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.2} {:>9}",
            "weighted avg", "", "", self.weighted_f1, self.total
        )
    }
}
