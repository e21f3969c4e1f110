//! Integration tests for the text topic pipeline

use rust_text_topics::{
    // Categorization
    categorize::{auto_cluster_count, UNCERTAIN, UNCLASSIFIED},
    AutoCategorizer,
    // Classification
    ModelBundle, TextClassifier,
    // Clustering
    silhouette_score, train_clustering, KMeans,
    // Data
    DataLoader, Dataset, Document,
    // NLP
    TextPreprocessor, TfIdf, Vectorizer,
    // Config
    PipelineConfig,
    scraping::parse_page,
};
use tempfile::tempdir;

fn vectorized_demo(max_features: usize) -> (Dataset, TextPreprocessor, TfIdf, Vec<Vec<f64>>) {
    let mut dataset = Dataset::demo();
    let preprocessor = TextPreprocessor::new();
    dataset.preprocess(&preprocessor);

    let mut tfidf = TfIdf::new()
        .with_max_features(Some(max_features))
        .with_ngram_range(1, 2)
        .with_min_df(2)
        .with_max_df(0.8);
    let dtm = tfidf.fit_transform(&dataset.processed_texts()).unwrap();
    (dataset, preprocessor, tfidf, dtm.matrix)
}

mod vectorization {
    use super::*;

    #[test]
    fn test_demo_rows_are_normalized() {
        let (_, _, tfidf, matrix) = vectorized_demo(100);

        assert_eq!(matrix.len(), 15);
        assert!(tfidf.n_features() > 0 && tfidf.n_features() <= 100);
        for row in &matrix {
            let norm: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
            assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_vocabulary_sorted_and_pruned() {
        let (dataset, _, tfidf, _) = vectorized_demo(1000);
        let names = tfidf.feature_names();

        let mut sorted = names.to_vec();
        sorted.sort();
        assert_eq!(names, sorted.as_slice());

        // every kept term occurs in at least two documents
        let texts = dataset.processed_texts();
        for term in names.iter().filter(|t| !t.contains(' ')) {
            let df = texts
                .iter()
                .filter(|t| t.split_whitespace().any(|w| w == term))
                .count();
            assert!(df >= 2, "term {} has df {}", term, df);
            assert!(df as f64 <= 0.8 * 15.0);
        }

        assert_eq!(tfidf.important_terms(5), names[..5].to_vec());
    }
}

mod classification {
    use super::*;

    #[test]
    fn test_train_on_demo_corpus() {
        let (dataset, _, _, matrix) = vectorized_demo(100);
        let labels = dataset.labels().unwrap();

        let mut classifier = TextClassifier::new(Default::default());
        let metrics = classifier.train(&matrix, &labels, 0.3).unwrap();

        assert!(metrics.stratified);
        assert_eq!(metrics.n_test, 5);
        assert_eq!(metrics.n_train, 10);
        assert!((0.0..=1.0).contains(&metrics.accuracy));
        assert_eq!(metrics.categories, vec!["Science", "Sports", "Technology"]);

        let total: usize = metrics.confusion_matrix.counts.iter().flatten().sum();
        assert_eq!(total, 5);
        let diagonal: usize = (0..3).map(|i| metrics.confusion_matrix.counts[i][i]).sum();
        assert!((diagonal as f64 / 5.0 - metrics.accuracy).abs() < 1e-12);
    }

    #[test]
    fn test_small_sample_corpus() {
        let mut dataset = Dataset::sample();
        dataset.preprocess(&TextPreprocessor::new());
        let mut tfidf = TfIdf::new().with_min_df(1).with_max_df(1.0);
        let dtm = tfidf.fit_transform(&dataset.processed_texts()).unwrap();

        let mut classifier = TextClassifier::new(Default::default());
        let metrics = classifier
            .train(&dtm.matrix, &dataset.labels().unwrap(), 0.2)
            .unwrap();

        // 9 documents, 3 classes: 9 < 12 so no stratification, test share 1/3
        assert!(!metrics.stratified);
        assert_eq!(metrics.n_test, 3);
    }

    #[test]
    fn test_model_bundle_round_trip() {
        let (dataset, preprocessor, tfidf, matrix) = vectorized_demo(100);
        let mut classifier = TextClassifier::new(Default::default());
        classifier
            .train(&matrix, &dataset.labels().unwrap(), 0.3)
            .unwrap();

        let bundle = ModelBundle::new(&preprocessor, tfidf, &classifier).unwrap();
        let text = "Los algoritmos de machine learning procesan datos";
        let before = bundle.classify_text(text).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        bundle.save(&path).unwrap();
        let loaded = ModelBundle::load(&path).unwrap();
        let after = loaded.classify_text(text).unwrap();

        assert_eq!(before.category, after.category);
        assert_eq!(before.processed_text, after.processed_text);
        let sum: f64 = after.probabilities.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert_eq!(after.category, after.probabilities[0].0);
        assert_eq!(loaded.categories, bundle.categories);
    }
}

mod clustering {
    use super::*;

    #[test]
    fn test_demo_clustering() {
        let (_, _, _, matrix) = vectorized_demo(100);
        let result = train_clustering(&matrix, 3, &Default::default()).unwrap();

        assert_eq!(result.labels.len(), 15);
        assert!(result.labels.iter().all(|&l| l < 3));
        let score = result.silhouette_score.unwrap();
        assert!((-1.0..=1.0).contains(&score));
        assert_eq!(result.cluster_sizes().iter().sum::<usize>(), 15);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (_, _, _, matrix) = vectorized_demo(100);
        let a = KMeans::new(3).fit_predict(&matrix).unwrap();
        let b = KMeans::new(3).fit_predict(&matrix).unwrap();
        assert_eq!(a.labels, b.labels);
        assert!((silhouette_score(&matrix, &a.labels).unwrap()
            - silhouette_score(&matrix, &b.labels).unwrap())
        .abs()
            < 1e-12);
    }
}

mod categorization {
    use super::*;

    #[test]
    fn test_analyze_demo_corpus() {
        let mut dataset = Dataset::demo();
        dataset.preprocess(&TextPreprocessor::new());

        let categorizer = AutoCategorizer::new();
        let summary = categorizer.analyze_and_categorize(&mut dataset);

        assert_eq!(summary.iter().map(|s| s.count).sum::<usize>(), 15);
        let known: Vec<&str> = categorizer
            .domains()
            .iter()
            .map(|(name, _)| name.as_str())
            .chain([UNCERTAIN, UNCLASSIFIED])
            .collect();
        for doc in &dataset {
            let category = doc.auto_category.as_deref().unwrap();
            let confidence = doc.category_confidence.unwrap();
            assert!(known.contains(&category));
            assert!((0.0..=1.0).contains(&confidence));
            if category != UNCERTAIN {
                assert!(confidence >= 0.3);
            }
        }
    }

    #[test]
    fn test_auto_labelled_clusters() {
        let (dataset, _, _, matrix) = vectorized_demo(100);
        let texts = dataset.processed_texts();

        let labeled = AutoCategorizer::new()
            .cluster_with_labels(&matrix, None, Some(&texts))
            .unwrap();

        assert_eq!(labeled.clustering.n_clusters, auto_cluster_count(15));
        assert_eq!(labeled.labels.len(), 3);
        for (label, keywords) in labeled.labels.iter().zip(&labeled.keywords) {
            assert!(!label.is_empty());
            assert!(keywords.len() <= 5);
        }
    }

    #[test]
    fn test_unlabelled_dataset_becomes_trainable() {
        let preprocessor = TextPreprocessor::new();
        let categorizer = AutoCategorizer::new();

        // Scraped documents carry no category
        let mut dataset = Dataset::from_documents(
            Dataset::demo()
                .into_documents()
                .into_iter()
                .map(|d| Document::new(d.title, d.text))
                .collect(),
        );
        assert!(dataset.labels().is_none());

        dataset.preprocess(&preprocessor);
        categorizer.analyze_and_categorize(&mut dataset);
        assert_eq!(dataset.adopt_auto_categories(), 15);

        let dir = tempdir().unwrap();
        let path = dir.path().join("labelled.csv");
        DataLoader::save(&dataset, &path).unwrap();

        let mut dataset = DataLoader::load(&path).unwrap();
        dataset.push(categorizer.label_document(
            &preprocessor,
            "Clásico",
            "El jugador marcó un gol en el partido de fútbol",
            None,
        ));
        DataLoader::save(&dataset, &path).unwrap();

        let mut dataset = DataLoader::load(&path).unwrap();
        assert_eq!(dataset.len(), 16);
        let labels = dataset.labels().unwrap();
        assert_eq!(labels[15], "Sports");

        dataset.preprocess(&preprocessor);
        let mut tfidf = TfIdf::new().with_min_df(1).with_max_df(1.0);
        let dtm = tfidf.fit_transform(&dataset.processed_texts()).unwrap();
        let metrics = TextClassifier::new(Default::default())
            .train(&dtm.matrix, &labels, 0.3)
            .unwrap();
        assert_eq!(metrics.n_train + metrics.n_test, 16);
    }

    #[test]
    fn test_custom_domain_from_config() {
        let mut config = PipelineConfig::default();
        config
            .categorizer
            .custom_domains
            .insert("Gaming".to_string(), vec!["videojuego".to_string(), "consola".to_string()]);

        let categorizer = AutoCategorizer::from_config(&config.categorizer, &config.clustering);
        let (category, confidence) = categorizer.detect_by_keywords("videojuego consola nuevo");
        assert_eq!(category, "Gaming");
        assert_eq!(confidence, 1.0);
    }
}

mod data_export {
    use super::*;

    #[test]
    fn test_processed_demo_csv_round_trip() {
        let (mut dataset, _, _, _) = vectorized_demo(100);
        dataset.documents_mut()[0].cluster = Some(1);

        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset_processed.csv");
        DataLoader::save(&dataset, &path).unwrap();
        let loaded = DataLoader::load(&path).unwrap();

        assert_eq!(loaded.len(), 15);
        assert_eq!(loaded.documents()[0].cluster, Some(1));
        assert_eq!(
            loaded.documents()[3].processed_text,
            dataset.documents()[3].processed_text
        );
        assert_eq!(loaded.category_distribution(), dataset.category_distribution());
    }

    #[test]
    fn test_config_file_partial() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"classifier": {"test_size": 0.3}}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.classifier.test_size, 0.3);
        assert_eq!(config.classifier.seed, 42);
        assert_eq!(config.vectorizer.max_features, Some(1000));
    }
}

mod scraping {
    use super::*;

    #[test]
    fn test_scraped_page_flows_through_pipeline() {
        let html = "<html><body><h1>Fútbol</h1>\
            <p>El equipo ganó el campeonato con un gol de su mejor jugador.</p>\
            <p>Los jugadores celebraron la victoria del equipo.</p></body></html>";
        let mut doc: Document = parse_page("https://example.com/futbol", html);
        assert_eq!(doc.title, "Fútbol");

        let preprocessor = TextPreprocessor::new();
        doc.processed_text = Some(preprocessor.process(&doc.text));

        let (category, confidence) =
            AutoCategorizer::new().detect_by_keywords(doc.processed_text.as_deref().unwrap());
        assert_eq!(category, "Sports");
        assert!(confidence > 0.5);
    }
}
