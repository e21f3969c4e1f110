//! CLI for the text topic pipeline
//!
//! Usage:
//! ```bash
//! cargo run -- --help
//! cargo run -- demo
//! cargo run -- scrape --url https://es.wikipedia.org/wiki/Python --output data.csv
//! cargo run -- categorize --input data.csv --output labelled.csv --as-labels
//! cargo run -- add --title "Final" --text "El equipo ganó la copa" --dataset labelled.csv
//! cargo run -- train --input labelled.csv --model model.json
//! cargo run -- predict --model model.json --text "El equipo ganó el partido"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rust_text_topics::{
    categorize::AutoCategorizer,
    classification::{ModelBundle, TextClassifier},
    clustering::train_clustering,
    config::PipelineConfig,
    data::{DataLoader, Dataset},
    models::DocumentTermMatrix,
    nlp::{TextPreprocessor, TfIdf, Vectorizer},
    report,
    scraping::WebScraper,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "text_topics")]
#[command(author = "ML for Trading")]
#[command(version = "0.1.0")]
#[command(about = "Classify, cluster and categorize text documents by topic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch articles and save them as a dataset
    Scrape {
        /// URL to fetch (repeatable)
        #[arg(short, long = "url")]
        urls: Vec<String>,

        /// File with one URL per line
        #[arg(long)]
        urls_file: Option<PathBuf>,

        /// Seconds to wait between requests
        #[arg(short, long)]
        delay: Option<f64>,

        /// Output file (.csv or .json)
        #[arg(short, long, default_value = "data/raw/scraped.csv")]
        output: PathBuf,
    },

    /// Preprocess and vectorize a dataset
    Process {
        /// Input dataset (built-in sample when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file with the processed text column
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of vocabulary terms to show
        #[arg(short, long, default_value = "20")]
        top: usize,
    },

    /// Train the classifier on a labelled dataset
    Train {
        /// Input dataset (built-in sample when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Where to save the trained model
        #[arg(short, long, default_value = "models/classifier.json")]
        model: PathBuf,

        /// Share of documents held out for evaluation
        #[arg(short, long)]
        test_size: Option<f64>,

        /// Where to save the metrics summary CSV
        #[arg(long)]
        metrics: Option<PathBuf>,
    },

    /// Classify new text with a trained model
    Predict {
        /// Trained model file
        #[arg(short, long, default_value = "models/classifier.json")]
        model: PathBuf,

        /// Text to classify (repeatable)
        #[arg(short, long = "text", required = true)]
        texts: Vec<String>,
    },

    /// Group documents with k-means and name the groups
    Cluster {
        /// Input dataset (built-in sample when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of clusters (chosen from the corpus size when omitted)
        #[arg(short = 'k', long)]
        clusters: Option<usize>,

        /// Output file with the cluster column
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assign categories from keyword dictionaries
    Categorize {
        /// Input dataset (built-in sample when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Categorize a single text instead of a dataset
        #[arg(short, long)]
        text: Option<String>,

        /// Output file with the auto category columns
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also use the detected categories as labels, so the output can
        /// train the classifier
        #[arg(long)]
        as_labels: bool,
    },

    /// Append one document to a dataset file
    Add {
        /// Document title
        #[arg(long)]
        title: String,

        /// Document text
        #[arg(short, long)]
        text: String,

        /// Category label (detected from keywords when omitted)
        #[arg(long)]
        category: Option<String>,

        /// Dataset file, created when missing
        #[arg(short, long, default_value = "data/processed/dataset.csv")]
        dataset: PathBuf,
    },

    /// Dataset statistics
    Stats {
        /// Input dataset (built-in sample when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of histogram bins
        #[arg(short, long, default_value = "10")]
        bins: usize,
    },

    /// Run the whole pipeline on the built-in demo corpus
    Demo {
        /// Directory for the exported dataset, model and metrics
        #[arg(short, long, default_value = "results")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {:?}", path))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Scrape {
            urls,
            urls_file,
            delay,
            output,
        } => run_scrape(&config, urls, urls_file, delay, &output).await?,
        Commands::Process { input, output, top } => run_process(&config, input, output, top)?,
        Commands::Train {
            input,
            model,
            test_size,
            metrics,
        } => run_train(&config, input, &model, test_size, metrics)?,
        Commands::Predict { model, texts } => run_predict(&model, &texts)?,
        Commands::Cluster {
            input,
            clusters,
            output,
        } => run_cluster(&config, input, clusters, output)?,
        Commands::Categorize {
            input,
            text,
            output,
            as_labels,
        } => run_categorize(&config, input, text, output, as_labels)?,
        Commands::Add {
            title,
            text,
            category,
            dataset,
        } => run_add(&config, &title, &text, category, &dataset)?,
        Commands::Stats { input, bins } => run_stats(input, bins)?,
        Commands::Demo { output_dir } => run_demo(&config, &output_dir)?,
    }

    Ok(())
}

fn load_dataset(input: Option<PathBuf>) -> Result<Dataset> {
    match input {
        Some(path) => {
            let dataset = DataLoader::load(&path)?;
            info!("Loaded {} documents from {:?}", dataset.len(), path);
            Ok(dataset)
        }
        None => {
            info!("No input given, using the built-in sample dataset");
            Ok(Dataset::sample())
        }
    }
}

fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    DataLoader::save(dataset, path)?;
    println!("💾 Dataset saved to {:?}", path);
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    Ok(())
}

/// Preprocess every document and fit TF-IDF on the result
fn vectorize(
    config: &PipelineConfig,
    dataset: &mut Dataset,
) -> Result<(TextPreprocessor, TfIdf, DocumentTermMatrix)> {
    let preprocessor = TextPreprocessor::from_config(&config.preprocessing);
    dataset.preprocess(&preprocessor);

    let mut tfidf = TfIdf::from_config(&config.vectorizer);
    let dtm = tfidf
        .fit_transform(&dataset.processed_texts())
        .context("Vectorization failed")?;
    Ok((preprocessor, tfidf, dtm))
}

async fn run_scrape(
    config: &PipelineConfig,
    mut urls: Vec<String>,
    urls_file: Option<PathBuf>,
    delay: Option<f64>,
    output: &Path,
) -> Result<()> {
    if let Some(path) = urls_file {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read URL list {:?}", path))?;
        urls.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
    }
    if urls.is_empty() {
        bail!("No URLs given, use --url or --urls-file");
    }

    println!("\n🌐 Fetching {} URLs...\n", urls.len());

    let mut scraper = WebScraper::new(&config.scraper)?;
    if let Some(delay) = delay {
        let delay = Duration::try_from_secs_f64(delay)
            .with_context(|| format!("Invalid delay: {} seconds", delay))?;
        scraper = scraper.with_delay(delay);
    }

    let dataset = scraper.fetch_many(&urls).await;
    println!("\n✅ Extracted {} documents", dataset.len());
    for doc in &dataset {
        println!("  • {} ({} words)", doc.title, doc.word_count);
    }

    if dataset.is_empty() {
        bail!("No document could be extracted");
    }
    save_dataset(&dataset, output)
}

fn run_process(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    let mut dataset = load_dataset(input)?;
    let (_, tfidf, dtm) = vectorize(config, &mut dataset)?;

    println!("\n🔧 Preprocessing");
    if let Some(doc) = dataset.documents().first() {
        println!("   Original:  {}", doc.preview(80));
        let processed = doc.processed_text.as_deref().unwrap_or_default();
        println!("   Processed: {}", truncate(processed, 60));
    }

    let (n_docs, n_terms) = dtm.shape();
    println!("\n🔢 Vectorization");
    println!("   Matrix shape: {} x {}", n_docs, n_terms);
    println!("   Documents:    {}", n_docs);
    println!("   Features:     {}", n_terms);

    println!("\n🎯 Top {} vocabulary terms:", top);
    for (i, term) in tfidf.important_terms(top).iter().enumerate() {
        println!("   {:2}. {}", i + 1, term);
    }

    if let Some(path) = output {
        save_dataset(&dataset, &path)?;
    }
    Ok(())
}

fn run_train(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    model_path: &Path,
    test_size: Option<f64>,
    metrics_path: Option<PathBuf>,
) -> Result<()> {
    let mut dataset = load_dataset(input)?;
    let labels = dataset
        .labels()
        .context(
            "Every document needs a category to train the classifier \
             (try `categorize --as-labels`)",
        )?;

    let (preprocessor, tfidf, dtm) = vectorize(config, &mut dataset)?;

    println!("\n🚀 Training classifier...");
    println!("   Samples:    {}", dtm.n_documents());
    println!("   Categories: {}", dataset.category_distribution().len());

    let mut classifier = TextClassifier::new(config.classifier.clone());
    let metrics = classifier.train(
        &dtm.matrix,
        &labels,
        test_size.unwrap_or(config.classifier.test_size),
    )?;

    println!("\n{}", metrics);

    let bundle = ModelBundle::new(&preprocessor, tfidf, &classifier)?;
    ensure_parent(model_path)?;
    bundle.save(model_path)?;
    println!("💾 Model saved to {:?}", model_path);

    if let Some(path) = metrics_path {
        ensure_parent(&path)?;
        DataLoader::save_metrics_summary(&metrics, dataset.len(), &path)?;
        println!("💾 Metrics summary saved to {:?}", path);
    }
    Ok(())
}

fn run_predict(model_path: &Path, texts: &[String]) -> Result<()> {
    let bundle = ModelBundle::load(model_path)
        .with_context(|| format!("Failed to load model {:?}", model_path))?;

    println!(
        "\n🔮 Model trained at {} on {} categories\n",
        bundle.trained_at.format("%Y-%m-%d %H:%M"),
        bundle.categories.len()
    );

    for (i, text) in texts.iter().enumerate() {
        let prediction = bundle.classify_text(text)?;
        println!("📝 Text {}: '{}'", i + 1, text);
        println!("   🎯 Prediction: {}", prediction.category);
        println!("   📊 Probabilities:");
        print!("{}", report::probability_bars(&prediction.probabilities));
        println!();
    }
    Ok(())
}

fn run_cluster(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    clusters: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut dataset = load_dataset(input)?;
    let (_, _, dtm) = vectorize(config, &mut dataset)?;
    let texts = dataset.processed_texts();

    let categorizer = AutoCategorizer::from_config(&config.categorizer, &config.clustering);
    let labeled = categorizer.cluster_with_labels(&dtm.matrix, clusters, Some(&texts))?;

    println!("\n{}", labeled.clustering);
    for (cluster, label) in labeled.labels.iter().enumerate() {
        let members = labeled.clustering.members(cluster);
        println!("Group {}: {}", cluster + 1, label);
        println!("   Documents: {}", members.len());
        println!("   Keywords:  {}", labeled.keywords[cluster].join(", "));
        for &i in &members {
            let doc = &dataset.documents()[i];
            match &doc.category {
                Some(category) => println!("     - {} [{}]", doc.title, category),
                None => println!("     - {}", doc.title),
            }
        }
    }

    for (doc, &cluster) in dataset
        .documents_mut()
        .iter_mut()
        .zip(&labeled.clustering.labels)
    {
        doc.cluster = Some(cluster);
    }

    if let Some(path) = output {
        save_dataset(&dataset, &path)?;
    }
    Ok(())
}

fn run_categorize(
    config: &PipelineConfig,
    input: Option<PathBuf>,
    text: Option<String>,
    output: Option<PathBuf>,
    as_labels: bool,
) -> Result<()> {
    let categorizer = AutoCategorizer::from_config(&config.categorizer, &config.clustering);
    let preprocessor = TextPreprocessor::from_config(&config.preprocessing);

    if let Some(text) = text {
        let (category, confidence) = categorizer.categorize_text(&preprocessor.process(&text));
        println!("\n✅ Detected category: {} (confidence: {:.2})", category, confidence);
        return Ok(());
    }

    let mut dataset = load_dataset(input)?;
    dataset.preprocess(&preprocessor);
    let summary = categorizer.analyze_and_categorize(&mut dataset);

    println!("\n📋 Results:");
    for doc in &dataset {
        println!(
            "  {:40} {:14} {:.2}",
            truncate(&doc.title, 40),
            doc.auto_category.as_deref().unwrap_or_default(),
            doc.category_confidence.unwrap_or_default()
        );
    }

    println!("\n📊 Distribution:");
    for s in &summary {
        println!(
            "  • {}: {} docs (mean confidence: {:.2})",
            s.category, s.count, s.mean_confidence
        );
    }

    if as_labels {
        let adopted = dataset.adopt_auto_categories();
        println!("\n🏷️  {} auto categories copied to the category column", adopted);
    }

    if let Some(path) = output {
        save_dataset(&dataset, &path)?;
    }
    Ok(())
}

fn run_add(
    config: &PipelineConfig,
    title: &str,
    text: &str,
    category: Option<String>,
    path: &Path,
) -> Result<()> {
    let categorizer = AutoCategorizer::from_config(&config.categorizer, &config.clustering);
    let preprocessor = TextPreprocessor::from_config(&config.preprocessing);

    let mut dataset = if path.exists() {
        DataLoader::load(path)?
    } else {
        info!("{:?} does not exist yet, starting a new dataset", path);
        Dataset::new()
    };

    let doc = categorizer.label_document(&preprocessor, title, text, category);
    println!(
        "\n✅ Added \"{}\" as {} ({} words)",
        doc.title,
        doc.category.as_deref().unwrap_or_default(),
        doc.word_count
    );
    dataset.push(doc);

    save_dataset(&dataset, path)?;
    println!("   The dataset now has {} documents", dataset.len());
    Ok(())
}

fn run_stats(input: Option<PathBuf>, bins: usize) -> Result<()> {
    let dataset = load_dataset(input)?;

    println!("\n📈 Dataset statistics");
    println!("   Documents:      {}", dataset.len());
    println!("   Total words:    {}", dataset.total_words());
    println!("   Mean words:     {:.1}", dataset.mean_words());

    let distribution = dataset.category_distribution();
    if !distribution.is_empty() {
        println!("\n📊 Documents per category:");
        print!("{}", report::distribution_chart(&distribution));
    }

    let auto = dataset.auto_category_distribution();
    if !auto.is_empty() {
        println!("\n🤖 Documents per automatic category:");
        print!("{}", report::distribution_chart(&auto));
    }

    println!("\n📏 Document length (words):");
    print!("{}", report::histogram_chart(&dataset.word_count_histogram(bins)));
    Ok(())
}

fn run_demo(config: &PipelineConfig, output_dir: &Path) -> Result<()> {
    // Step 1: data
    print!("{}", report::section("📦 STEP 1: DATA"));
    let mut dataset = Dataset::demo();
    println!("Dataset created: {} documents", dataset.len());
    print!("{}", report::distribution_chart(&dataset.category_distribution()));
    println!("\nSample:");
    for doc in dataset.iter().take(3) {
        println!(
            "  {:50} {:12} {}",
            doc.title,
            doc.category.as_deref().unwrap_or_default(),
            doc.word_count
        );
    }

    // Step 2: preprocessing
    print!("{}", report::section("🔧 STEP 2: TEXT PREPROCESSING"));
    let mut demo_config = config.clone();
    demo_config.vectorizer.max_features = Some(100);
    let (preprocessor, tfidf, dtm) = vectorize(&demo_config, &mut dataset)?;

    if let Some(doc) = dataset.documents().first() {
        println!("Original:  {}...", truncate(&doc.text, 80));
        let processed = doc.processed_text.as_deref().unwrap_or_default();
        println!("Processed: {}...", truncate(processed, 60));
    }
    let (n_docs, n_terms) = dtm.shape();
    println!("\nMatrix shape: {} documents x {} features", n_docs, n_terms);
    println!("\nTop 15 vocabulary terms:");
    for (i, term) in tfidf.important_terms(15).iter().enumerate() {
        println!("  {:2}. {}", i + 1, term);
    }

    // Step 3: training
    print!("{}", report::section("🤖 STEP 3: TRAINING"));
    let labels = dataset
        .labels()
        .context("Demo corpus must be fully labelled")?;
    let mut classifier = TextClassifier::new(config.classifier.clone());
    let metrics = classifier.train(&dtm.matrix, &labels, 0.3)?;
    println!("{}", metrics);

    // Step 4: predictions
    print!("{}", report::section("🔮 STEP 4: PREDICTIONS"));
    let bundle = ModelBundle::new(&preprocessor, tfidf, &classifier)?;
    let checks = [
        (
            "Los algoritmos de deep learning están mejorando el procesamiento de imágenes médicas",
            "Technology",
        ),
        (
            "El equipo ganó el partido con un gol en el último minuto del tiempo extra",
            "Sports",
        ),
        (
            "Los científicos descubrieron un nuevo exoplaneta en una galaxia lejana",
            "Science",
        ),
    ];
    let mut correct = 0;
    for (i, (text, expected)) in checks.iter().enumerate() {
        let prediction = bundle.classify_text(text)?;
        let ok = prediction.category == *expected;
        if ok {
            correct += 1;
        }
        println!("📝 Text {}: '{}'", i + 1, text);
        println!("   Prediction: {}", prediction.category);
        println!("   Expected:   {}", expected);
        println!("   {}", if ok { "✅ CORRECT" } else { "❌ INCORRECT" });
        print!("{}", report::probability_bars(&prediction.probabilities));
        println!();
    }

    // Step 5: clustering
    print!("{}", report::section("🎯 STEP 5: CLUSTERING"));
    let clustering = train_clustering(&dtm.matrix, 3, &config.clustering)?;
    println!("{}", clustering);
    for cluster in 0..clustering.n_clusters {
        let members: Vec<_> = clustering
            .members(cluster)
            .into_iter()
            .map(|i| dataset.documents()[i].clone())
            .collect();
        let categories = Dataset::from_documents(members).category_distribution();
        let summary: Vec<String> = categories
            .iter()
            .map(|(c, n)| format!("{}: {}", c, n))
            .collect();
        println!("  Cluster {} categories: {{{}}}", cluster, summary.join(", "));
    }
    for (doc, &cluster) in dataset.documents_mut().iter_mut().zip(&clustering.labels) {
        doc.cluster = Some(cluster);
    }

    // Step 6: automatic categorization
    print!("{}", report::section("🏷️  STEP 6: AUTOMATIC CATEGORIZATION"));
    let categorizer = AutoCategorizer::from_config(&config.categorizer, &config.clustering);
    let summary = categorizer.analyze_and_categorize(&mut dataset);
    for s in &summary {
        println!(
            "  • {}: {} docs (mean confidence: {:.2})",
            s.category, s.count, s.mean_confidence
        );
    }
    let labeled =
        categorizer.cluster_with_labels(&dtm.matrix, None, Some(&dataset.processed_texts()))?;
    for (cluster, label) in labeled.labels.iter().enumerate() {
        println!(
            "  Group {}: {} ({} docs, keywords: {})",
            cluster + 1,
            label,
            labeled.clustering.members(cluster).len(),
            labeled.keywords[cluster].iter().take(3).cloned().collect::<Vec<_>>().join(", ")
        );
    }

    // Step 7: export
    print!("{}", report::section("💾 STEP 7: SAVING RESULTS"));
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory {:?}", output_dir))?;
    save_dataset(&dataset, &output_dir.join("dataset_processed.csv"))?;

    let model_path = output_dir.join("classifier.json");
    bundle.save(&model_path)?;
    println!("💾 Model saved to {:?}", model_path);

    let metrics_path = output_dir.join("metrics_summary.csv");
    DataLoader::save_metrics_summary(&metrics, dataset.len(), &metrics_path)?;
    println!("💾 Metrics summary saved to {:?}", metrics_path);

    print!("{}", report::section("🎉 DEMO COMPLETE"));
    println!("  Documents processed: {}", dataset.len());
    println!("  Model accuracy:      {:.2}%", metrics.accuracy * 100.0);
    println!("  Correct predictions: {}/{}", correct, checks.len());
    println!("  Clusters:            {}", clustering.n_clusters);
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
