//! Dataset and metrics export
//!
//! Documents are written as one CSV row per document (feature vectors are
//! not exported) or as a JSON array.

use super::dataset::Dataset;
use crate::models::{Document, TrainingMetrics};
use anyhow::{Context, Result};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One `metric,value` row of the metrics summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: String,
    pub value: String,
}

/// Loader for dataset and metrics files
pub struct DataLoader;

impl DataLoader {
    /// Load documents from a CSV file
    pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let mut reader = Reader::from_reader(file);
        let mut documents = Vec::new();

        for result in reader.deserialize() {
            let mut document: Document = result.context("Failed to parse document")?;
            document.fill_word_count();
            documents.push(document);
        }

        Ok(Dataset::from_documents(documents))
    }

    /// Save documents to a CSV file
    pub fn save_csv<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        let mut writer = Writer::from_writer(file);

        for document in dataset {
            writer.serialize(document)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load documents from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open file: {:?}", path.as_ref()))?;

        let mut documents: Vec<Document> = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse JSON: {:?}", path.as_ref()))?;
        documents.iter_mut().for_each(Document::fill_word_count);
        Ok(Dataset::from_documents(documents))
    }

    /// Save documents to a JSON file
    pub fn save_json<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        serde_json::to_writer_pretty(file, dataset.documents())?;
        Ok(())
    }

    /// Load by extension: `.json` as JSON, anything else as CSV
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Dataset> {
        if is_json(path.as_ref()) {
            Self::load_json(path)
        } else {
            Self::load_csv(path)
        }
    }

    /// Save by extension: `.json` as JSON, anything else as CSV
    pub fn save<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
        if is_json(path.as_ref()) {
            Self::save_json(dataset, path)
        } else {
            Self::save_csv(dataset, path)
        }
    }

    /// Rows of the metrics summary: accuracy, weighted F1, documents, categories
    pub fn metrics_summary(metrics: &TrainingMetrics, n_documents: usize) -> Vec<MetricRow> {
        let row = |metric: &str, value: String| MetricRow {
            metric: metric.to_string(),
            value,
        };
        vec![
            row("accuracy", format!("{:.2}%", metrics.accuracy * 100.0)),
            row(
                "f1_score",
                format!("{:.3}", metrics.report.weighted_avg.f1_score),
            ),
            row("documents", n_documents.to_string()),
            row("categories", metrics.categories.len().to_string()),
        ]
    }

    /// Save the metrics summary as a `metric,value` CSV
    pub fn save_metrics_summary<P: AsRef<Path>>(
        metrics: &TrainingMetrics,
        n_documents: usize,
        path: P,
    ) -> Result<()> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create file: {:?}", path.as_ref()))?;

        let mut writer = Writer::from_writer(file);
        for row in Self::metrics_summary(metrics, n_documents) {
            writer.serialize(row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClassMetrics, ClassificationReport, ConfusionMatrix};
    use tempfile::tempdir;

    fn dataset() -> Dataset {
        let mut doc = Document::new("Fútbol, hoy", "El equipo ganó el \"partido\"")
            .with_category("Sports")
            .with_url("https://example.com/a");
        doc.processed_text = Some("equip gan part".to_string());
        doc.auto_category = Some("Sports".to_string());
        doc.category_confidence = Some(1.0);
        doc.cluster = Some(2);

        Dataset::from_documents(vec![doc, Document::new("Sin datos", "texto corto")])
    }

    #[test]
    fn test_save_and_load_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.csv");

        DataLoader::save(&dataset(), &path).unwrap();
        let loaded = DataLoader::load(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        let first = &loaded.documents()[0];
        assert_eq!(first.title, "Fútbol, hoy");
        assert_eq!(first.text, "El equipo ganó el \"partido\"");
        assert_eq!(first.cluster, Some(2));
        assert_eq!(first.category_confidence, Some(1.0));
        assert_eq!(loaded.documents()[1].category, None);
        assert_eq!(loaded.documents()[1].word_count, 2);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.json");

        DataLoader::save(&dataset(), &path).unwrap();
        let loaded = DataLoader::load(&path).unwrap();

        assert_eq!(loaded, dataset());
    }

    #[test]
    fn test_load_hand_written_files_counts_words() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("manual.csv");
        std::fs::write(
            &csv_path,
            "title,text,category\na,el equipo ganó el partido,Sports\n",
        )
        .unwrap();

        let loaded = DataLoader::load(&csv_path).unwrap();
        assert_eq!(loaded.documents()[0].word_count, 5);
        assert_eq!(loaded.documents()[0].category.as_deref(), Some("Sports"));
        assert_eq!(loaded.total_words(), 5);

        let json_path = dir.path().join("manual.json");
        std::fs::write(&json_path, r#"[{"title": "b", "text": "uno dos tres"}]"#).unwrap();
        let loaded = DataLoader::load(&json_path).unwrap();
        assert_eq!(loaded.documents()[0].word_count, 3);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(DataLoader::load_csv("/nonexistent/dataset.csv").is_err());
    }

    #[test]
    fn test_metrics_summary() {
        let metrics = TrainingMetrics {
            accuracy: 0.8,
            report: ClassificationReport {
                per_class: Vec::new(),
                accuracy: 0.8,
                macro_avg: ClassMetrics::default(),
                weighted_avg: ClassMetrics {
                    f1_score: 0.75,
                    ..Default::default()
                },
            },
            confusion_matrix: ConfusionMatrix {
                labels: Vec::new(),
                counts: Vec::new(),
            },
            categories: vec!["a".into(), "b".into()],
            n_train: 8,
            n_test: 2,
            stratified: false,
        };

        let rows = DataLoader::metrics_summary(&metrics, 10);
        assert_eq!(rows[0].value, "80.00%");
        assert_eq!(rows[1].value, "0.750");
        assert_eq!(rows[2].value, "10");
        assert_eq!(rows[3].value, "2");

        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        DataLoader::save_metrics_summary(&metrics, 10, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("metric,value\n"));
        assert!(content.contains("accuracy,80.00%"));
    }
}
