//! Document collection with summary statistics

use crate::models::Document;
use crate::nlp::TextPreprocessor;
use std::collections::BTreeMap;

/// One bar of the word-count histogram, `lower..=upper`
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: usize,
    pub upper: usize,
    pub count: usize,
}

/// Ordered collection of documents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    documents: Vec<Document>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn push(&mut self, document: Document) {
        self.documents.push(document);
    }

    pub fn extend(&mut self, other: Dataset) {
        self.documents.extend(other.documents);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [Document] {
        &mut self.documents
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    pub fn texts(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.text.clone()).collect()
    }

    /// Processed texts, empty strings for documents not yet processed
    pub fn processed_texts(&self) -> Vec<String> {
        self.documents
            .iter()
            .map(|d| d.processed_text.clone().unwrap_or_default())
            .collect()
    }

    /// Category labels, `None` unless every document has one
    pub fn labels(&self) -> Option<Vec<String>> {
        self.documents.iter().map(|d| d.category.clone()).collect()
    }

    /// Use each document's auto category as its label so the dataset can
    /// train the classifier. Returns how many labels were set.
    pub fn adopt_auto_categories(&mut self) -> usize {
        let mut adopted = 0;
        for doc in &mut self.documents {
            if let Some(auto) = &doc.auto_category {
                doc.category = Some(auto.clone());
                adopted += 1;
            }
        }
        adopted
    }

    /// Run the preprocessing pipeline and store the result on each document
    pub fn preprocess(&mut self, preprocessor: &TextPreprocessor) {
        for doc in &mut self.documents {
            doc.processed_text = Some(preprocessor.process(&doc.text));
        }
    }

    /// Documents per label, largest first (ties by name)
    pub fn category_distribution(&self) -> Vec<(String, usize)> {
        distribution(self.documents.iter().filter_map(|d| d.category.as_deref()))
    }

    /// Documents per automatic category, largest first (ties by name)
    pub fn auto_category_distribution(&self) -> Vec<(String, usize)> {
        distribution(
            self.documents
                .iter()
                .filter_map(|d| d.auto_category.as_deref()),
        )
    }

    pub fn total_words(&self) -> usize {
        self.documents.iter().map(|d| d.word_count).sum()
    }

    pub fn mean_words(&self) -> f64 {
        if self.documents.is_empty() {
            return 0.0;
        }
        self.total_words() as f64 / self.documents.len() as f64
    }

    /// Equal-width histogram of word counts between the shortest and the
    /// longest document
    pub fn word_count_histogram(&self, bins: usize) -> Vec<HistogramBin> {
        let counts: Vec<usize> = self.documents.iter().map(|d| d.word_count).collect();
        let (Some(&min), Some(&max)) = (counts.iter().min(), counts.iter().max()) else {
            return Vec::new();
        };
        let bins = bins.max(1);
        let width = ((max - min) / bins + 1).max(1);
        let n_bins = (max - min) / width + 1;

        let mut histogram: Vec<HistogramBin> = (0..n_bins)
            .map(|i| HistogramBin {
                lower: min + i * width,
                upper: min + (i + 1) * width - 1,
                count: 0,
            })
            .collect();
        for c in counts {
            histogram[(c - min) / width].count += 1;
        }
        histogram
    }

    /// 15 labelled Spanish articles: 5 Technology, 5 Sports, 5 Science
    pub fn demo() -> Self {
        build(DEMO_CORPUS)
    }

    /// Shorter 9-article sample with the same three categories
    pub fn sample() -> Self {
        build(SAMPLE_CORPUS)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut result: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    // BTreeMap order is by name, stable sort keeps it for equal counts
    result.sort_by(|a, b| b.1.cmp(&a.1));
    result
}

fn build(corpus: &[(&str, &str, &str)]) -> Dataset {
    Dataset::from_documents(
        corpus
            .iter()
            .map(|(title, text, category)| Document::new(*title, *text).with_category(*category))
            .collect(),
    )
}

const DEMO_CORPUS: &[(&str, &str, &str)] = &[
    (
        "Inteligencia Artificial en la Medicina Moderna",
        "La inteligencia artificial está transformando el diagnóstico médico mediante algoritmos avanzados de aprendizaje profundo que analizan imágenes médicas radiografías y tomografías con precisión superior a los métodos tradicionales",
        "Technology",
    ),
    (
        "Nuevos Algoritmos de Machine Learning",
        "Los nuevos algoritmos de machine learning permiten procesar grandes volúmenes de datos con mayor precisión y eficiencia en tiempo real utilizando técnicas de aprendizaje supervisado no supervisado y por refuerzo",
        "Technology",
    ),
    (
        "Python: El Lenguaje para Ciencia de Datos",
        "Python se ha consolidado como el lenguaje preferido para análisis de datos y machine learning gracias a bibliotecas como pandas numpy scikit-learn tensorflow y pytorch que facilitan el desarrollo de modelos",
        "Technology",
    ),
    (
        "Deep Learning y Redes Neuronales Convolucionales",
        "Las redes neuronales convolucionales revolucionan el reconocimiento de imágenes procesamiento de video y visión por computadora alcanzando resultados impresionantes en clasificación detección y segmentación de objetos",
        "Technology",
    ),
    (
        "Computación Cuántica: El Futuro de la Tecnología",
        "La computación cuántica promete resolver problemas complejos que son intratables para computadoras clásicas mediante el uso de qubits superposición y entrelazamiento cuántico abriendo nuevas posibilidades tecnológicas",
        "Technology",
    ),
    (
        "Campeonato Mundial de Fútbol 2024",
        "El campeonato mundial de fútbol reúne a las mejores selecciones del planeta en un torneo emocionante con millones de espectadores en estadios y por televisión celebrando goles jugadas espectaculares y momentos históricos",
        "Sports",
    ),
    (
        "Los Mejores Jugadores de Basketball",
        "Los jugadores de basketball más destacados demuestran habilidades excepcionales en cancha lideran a sus equipos hacia la victoria realizan mates espectaculares y tiros de tres puntos con precisión asombrosa",
        "Sports",
    ),
    (
        "Técnicas Avanzadas de Entrenamiento Deportivo",
        "Las técnicas modernas de entrenamiento deportivo combinan ciencia ejercicio físico nutrición adecuada y preparación mental para optimizar el rendimiento de los atletas en competencias de alto nivel",
        "Sports",
    ),
    (
        "Olimpiadas: Récords y Hazañas Deportivas",
        "Las olimpiadas representan la cumbre del deporte mundial donde atletas de todas las disciplinas compiten por medallas de oro estableciendo récords mundiales y superando límites humanos en pruebas de velocidad resistencia y fuerza",
        "Sports",
    ),
    (
        "Nutrición Deportiva para Atletas de Alto Rendimiento",
        "La nutrición deportiva es fundamental para atletas de élite proporcionando los nutrientes necesarios para entrenamientos intensos recuperación muscular y mantener niveles óptimos de energía durante competencias",
        "Sports",
    ),
    (
        "Descubrimiento Revolucionario en Física Cuántica",
        "Científicos han logrado avances significativos en física cuántica que podrían revolucionar la computación las comunicaciones y nuestra comprensión fundamental de la naturaleza del universo y sus leyes físicas",
        "Science",
    ),
    (
        "Avances en Biología Molecular y Genética",
        "La investigación en biología molecular revela nuevos mecanismos celulares procesos genéticos y estructuras proteicas que abren posibilidades para tratamientos médicos innovadores y terapias génicas revolucionarias",
        "Science",
    ),
    (
        "Nueva Teoría sobre el Origen del Universo",
        "Una nueva teoría cosmológica propone explicaciones alternativas sobre la formación y evolución del universo el origen de la materia oscura y la expansión acelerada del cosmos observable",
        "Science",
    ),
    (
        "Cambio Climático: Estudios y Proyecciones",
        "Los estudios sobre cambio climático analizan datos atmosféricos patrones meteorológicos aumento de temperaturas derretimiento de glaciares y proyectan escenarios futuros para la Tierra basados en modelos científicos",
        "Science",
    ),
    (
        "Exploración Espacial: Misión a Marte",
        "La exploración espacial continúa avanzando con misiones robóticas a Marte búsqueda de vida extraterrestre colonización de otros planetas y desarrollo de tecnologías para viajes interplanetarios de larga duración",
        "Science",
    ),
];

const SAMPLE_CORPUS: &[(&str, &str, &str)] = &[
    (
        "Inteligencia Artificial en la Medicina",
        "La inteligencia artificial está transformando el diagnóstico médico mediante algoritmos avanzados de aprendizaje profundo que analizan imágenes y datos clínicos.",
        "Technology",
    ),
    (
        "Nuevos Algoritmos de Machine Learning",
        "Los nuevos algoritmos de machine learning permiten procesar grandes volúmenes de datos con mayor precisión y eficiencia en tiempo real.",
        "Technology",
    ),
    (
        "Python para Ciencia de Datos",
        "Python se ha consolidado como el lenguaje preferido para análisis de datos gracias a bibliotecas como pandas numpy y scikit-learn.",
        "Technology",
    ),
    (
        "Campeonato Mundial de Fútbol 2024",
        "El campeonato mundial de fútbol reúne a las mejores selecciones del planeta en un torneo emocionante con millones de espectadores.",
        "Sports",
    ),
    (
        "Los Mejores Jugadores de Basketball",
        "Los jugadores de basketball más destacados demuestran habilidades excepcionales en cancha y lideran a sus equipos hacia la victoria.",
        "Sports",
    ),
    (
        "Técnicas de Entrenamiento Deportivo",
        "Las técnicas modernas de entrenamiento deportivo combinan ciencia ejercicio y nutrición para optimizar el rendimiento de los atletas.",
        "Sports",
    ),
    (
        "Descubrimiento en Física Cuántica",
        "Científicos han logrado avances significativos en física cuántica que podrían revolucionar la computación y las comunicaciones.",
        "Science",
    ),
    (
        "Avances en Biología Molecular",
        "La investigación en biología molecular revela nuevos mecanismos celulares que abren posibilidades para tratamientos médicos innovadores.",
        "Science",
    ),
    (
        "Nueva Teoría sobre el Universo",
        "Una nueva teoría cosmológica propone explicaciones alternativas sobre la formación y evolución del universo observable.",
        "Science",
    ),
];
