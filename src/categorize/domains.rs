//! Built-in keyword dictionaries
//!
//! Keywords are Spanish stems and words; matching is by substring in either
//! direction, so `"olimp"` matches `"olimpiadas"` and `"equipo"` matches the
//! stem `"equip"`.

/// (domain label, keywords), in matching priority order
pub const DEFAULT_DOMAINS: &[(&str, &[&str])] = &[
    (
        "Music",
        &[
            "música", "canción", "cantante", "álbum", "banda", "artista", "concierto", "disco",
            "vocal", "instrumento", "melodía", "compositor", "hip", "hop", "rock", "pop", "jazz",
            "folk", "electrónic", "rap",
        ],
    ),
    (
        "Sports",
        &[
            "deporte", "jugador", "equipo", "partido", "campeonato", "fútbol", "basketball",
            "tenis", "olimp", "medalla", "entrenamiento", "atleta", "gol", "canasta", "victoria",
            "competencia", "campeón",
        ],
    ),
    (
        "Technology",
        &[
            "tecnología", "software", "programa", "computadora", "internet", "algoritmo", "dato",
            "inteligencia", "artificial", "machine", "learning", "python", "código", "desarrollo",
            "aplicación", "digital", "red", "neuronal", "modelo", "sistema",
        ],
    ),
    (
        "Science",
        &[
            "científico", "investigación", "estudio", "experimento", "teoría", "física",
            "química", "biología", "átomo", "molécula", "célula", "universo", "planeta",
            "espacio", "laboratorio", "análisis",
        ],
    ),
    (
        "Politics",
        &[
            "político", "gobierno", "presidente", "parlamento", "ley", "elección", "partido",
            "votación", "democracia", "estado",
        ],
    ),
    (
        "Economy",
        &[
            "económico", "mercado", "empresa", "negocio", "dinero", "banco", "inversión",
            "finanza", "comercio", "producto",
        ],
    ),
    (
        "Art",
        &[
            "arte", "pintura", "artista", "obra", "museo", "exposición", "escultura", "creativo",
            "estético", "cultura",
        ],
    ),
    (
        "Literature",
        &[
            "libro", "autor", "novela", "escritor", "poesía", "texto", "literario", "narrativa",
            "cuento", "página",
        ],
    ),
    (
        "Film",
        &[
            "película", "cine", "director", "actor", "film", "escena", "producción", "estreno",
            "pantalla", "audiovisual",
        ],
    ),
    (
        "History",
        &[
            "histórico", "siglo", "guerra", "antiguo", "época", "civilización", "imperio",
            "revolución", "pasado",
        ],
    ),
];

/// Built-in domains as owned keyword lists
pub fn default_domains() -> Vec<(String, Vec<String>)> {
    DEFAULT_DOMAINS
        .iter()
        .map(|(name, keywords)| {
            (
                name.to_string(),
                keywords.iter().map(|k| k.to_string()).collect(),
            )
        })
        .collect()
}
