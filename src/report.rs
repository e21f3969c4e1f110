//! Plain-text rendering of results for the terminal

use crate::data::HistogramBin;
use crate::models::{ClassificationReport, ClusteringResult, ConfusionMatrix, TrainingMetrics};
use std::fmt::{self, Write};

/// Width of a full probability bar
const BAR_WIDTH: usize = 20;

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .iter()
            .map(|(name, _)| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(12);

        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9}  {:>7}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, m) in &self.per_class {
            writeln!(
                f,
                "{:>width$}  {:>9.3}  {:>9.3}  {:>9.3}  {:>7}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9}  {:>9}  {:>9.3}  {:>7}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.3}  {:>9.3}  {:>9.3}  {:>7}",
                name, m.precision, m.recall, m.f1_score, m.support
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);

        write!(f, "{:>width$}", "true \\ pred")?;
        for label in &self.labels {
            write!(f, "  {:>width$}", label)?;
        }
        writeln!(f)?;
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "{:>width$}", label)?;
            for count in row {
                write!(f, "  {:>width$}", count)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for TrainingMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Training Metrics:")?;
        writeln!(f, "  Accuracy:       {:>8.2}%", self.accuracy * 100.0)?;
        writeln!(f, "  Weighted F1:    {:>8.3}", self.report.weighted_avg.f1_score)?;
        writeln!(f, "  Train / Test:   {:>4} / {}", self.n_train, self.n_test)?;
        writeln!(
            f,
            "  Stratified:     {:>8}",
            if self.stratified { "yes" } else { "no" }
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.report)?;
        write!(f, "{}", self.confusion_matrix)
    }
}

impl fmt::Display for ClusteringResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Clustering:")?;
        writeln!(f, "  Clusters:       {:>8}", self.n_clusters)?;
        match self.silhouette_score {
            Some(score) => writeln!(f, "  Silhouette:     {:>8.3}", score)?,
            None => writeln!(f, "  Silhouette:     {:>8}", "n/a")?,
        }
        writeln!(f, "  Inertia:        {:>8.3}", self.inertia)?;
        for (cluster, size) in self.cluster_sizes().iter().enumerate() {
            writeln!(f, "  Cluster {}: {} documents", cluster, size)?;
        }
        Ok(())
    }
}

/// Horizontal bar of `value` (0.0 - 1.0) scaled to `width` characters
pub fn bar(value: f64, width: usize) -> String {
    let filled = ((value.clamp(0.0, 1.0) * width as f64) as usize).min(width);
    "█".repeat(filled)
}

/// One line per class: name, bar, percentage
pub fn probability_bars(probabilities: &[(String, f64)]) -> String {
    let mut out = String::new();
    for (name, p) in probabilities {
        let _ = writeln!(
            out,
            "  {:12} {:w$} {:>7.2}%",
            name,
            bar(*p, BAR_WIDTH),
            p * 100.0,
            w = BAR_WIDTH
        );
    }
    out
}

/// Label counts as bars relative to the largest count
pub fn distribution_chart(distribution: &[(String, usize)]) -> String {
    let max = distribution.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let mut out = String::new();
    for (label, count) in distribution {
        let ratio = if max > 0 { *count as f64 / max as f64 } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:16} {:w$} {}",
            label,
            bar(ratio, BAR_WIDTH),
            count,
            w = BAR_WIDTH
        );
    }
    out
}

/// Word-count histogram, one line per bin
pub fn histogram_chart(bins: &[HistogramBin]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let mut out = String::new();
    for b in bins {
        let ratio = if max > 0 { b.count as f64 / max as f64 } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:>5} - {:<5} {:w$} {}",
            b.lower,
            b.upper,
            bar(ratio, BAR_WIDTH),
            b.count,
            w = BAR_WIDTH
        );
    }
    out
}

/// Section header framed by `=` rules
pub fn section(title: &str) -> String {
    let rule = "=".repeat(70);
    format!("\n{rule}\n  {title}\n{rule}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClassMetrics;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0.5, 20).chars().count(), 10);
        assert_eq!(bar(1.5, 20).chars().count(), 20);
        assert_eq!(bar(-1.0, 20), "");
    }

    #[test]
    fn test_probability_bars() {
        let out = probability_bars(&[("Sports".to_string(), 0.75), ("Science".to_string(), 0.25)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Sports"));
        assert!(lines[0].contains("75.00%"));
        assert_eq!(lines[0].matches('█').count(), 15);
    }

    #[test]
    fn test_report_display() {
        let m = ClassMetrics {
            precision: 1.0,
            recall: 0.5,
            f1_score: 0.667,
            support: 2,
        };
        let report = ClassificationReport {
            per_class: vec![("Sports".to_string(), m)],
            accuracy: 0.5,
            macro_avg: m,
            weighted_avg: m,
        };
        let text = report.to_string();
        assert!(text.contains("Sports"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("0.667"));
    }

    #[test]
    fn test_confusion_display() {
        let cm = ConfusionMatrix {
            labels: vec!["a".into(), "b".into()],
            counts: vec![vec![2, 0], vec![1, 3]],
        };
        let text = cm.to_string();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_histogram_chart() {
        let bins = vec![
            HistogramBin { lower: 0, upper: 9, count: 2 },
            HistogramBin { lower: 10, upper: 19, count: 0 },
        ];
        let out = histogram_chart(&bins);
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().next().unwrap().ends_with(" 2"));
    }
}
