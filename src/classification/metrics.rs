//! Classification metrics

use crate::models::{ClassMetrics, ClassificationReport, ConfusionMatrix};

/// Share of predictions equal to the true label
pub fn accuracy_score(y_true: &[String], y_pred: &[String]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / y_true.len() as f64
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

/// Per-class precision, recall and F1 over `labels`; undefined ratios are 0
pub fn classification_report(
    y_true: &[String],
    y_pred: &[String],
    labels: &[String],
) -> ClassificationReport {
    let per_class: Vec<(String, ClassMetrics)> = labels
        .iter()
        .map(|label| {
            let tp = y_true
                .iter()
                .zip(y_pred.iter())
                .filter(|(t, p)| *t == label && *p == label)
                .count();
            let predicted = y_pred.iter().filter(|p| *p == label).count();
            let support = y_true.iter().filter(|t| *t == label).count();

            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1_score = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            (
                label.clone(),
                ClassMetrics {
                    precision,
                    recall,
                    f1_score,
                    support,
                },
            )
        })
        .collect();

    let total_support: usize = per_class.iter().map(|(_, m)| m.support).sum();
    let n_labels = per_class.len().max(1) as f64;

    let mut macro_avg = ClassMetrics {
        support: total_support,
        ..Default::default()
    };
    let mut weighted_avg = macro_avg;

    for (_, m) in &per_class {
        macro_avg.precision += m.precision / n_labels;
        macro_avg.recall += m.recall / n_labels;
        macro_avg.f1_score += m.f1_score / n_labels;

        if total_support > 0 {
            let w = m.support as f64 / total_support as f64;
            weighted_avg.precision += m.precision * w;
            weighted_avg.recall += m.recall * w;
            weighted_avg.f1_score += m.f1_score * w;
        }
    }

    ClassificationReport {
        per_class,
        accuracy: accuracy_score(y_true, y_pred),
        macro_avg,
        weighted_avg,
    }
}

/// Confusion matrix over `labels`; pairs with unknown labels are skipped
pub fn confusion_matrix(y_true: &[String], y_pred: &[String], labels: &[String]) -> ConfusionMatrix {
    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
    let index = |l: &String| labels.iter().position(|x| x == l);

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        if let (Some(i), Some(j)) = (index(t), index(p)) {
            counts[i][j] += 1;
        }
    }

    ConfusionMatrix {
        labels: labels.to_vec(),
        counts,
    }
}
