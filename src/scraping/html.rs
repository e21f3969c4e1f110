//! Regex-based HTML text extraction
//!
//! Only the first `<h1>` and the `<p>` elements are of interest, so a full
//! DOM parser is not needed. Markup inside them is dropped and entities are
//! decoded.

use crate::models::Document;
use regex::Regex;
use std::sync::LazyLock;

/// Title used when a page has no `<h1>`
pub const UNTITLED: &str = "Untitled";

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
        .unwrap()
});
static H1: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<h1\b[^>]*>(.*?)</h1\s*>").unwrap());
static PARAGRAPH_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<p\b[^>]*>").unwrap());
// `</p>` is optional: a paragraph also ends at the next `<p>` or at any
// block-level tag, opening or closing.
static PARAGRAPH_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</p\s*>|<p\b[^>]*>|</?(?:div|section|article|main|header|footer|aside|nav|form|table|tr|td|th|ul|ol|li|dl|dt|dd|blockquote|pre|h[1-6]|body|html)\b[^>]*>",
    )
    .unwrap()
});
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:br|p|div|section|article|table|tr|td|th|ul|ol|li|dl|dt|dd|blockquote|pre|h[1-6])\b[^>]*>",
    )
    .unwrap()
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s.,;:!?¿¡\-]").unwrap());

/// Text of the first `<h1>`, trimmed
pub fn extract_title(html: &str) -> Option<String> {
    let html = SCRIPT_STYLE.replace_all(html, "");
    H1.captures(&html)
        .map(|caps| inner_text(&caps[1]).trim().to_string())
}

/// Text of every `<p>`, each trimmed, in document order.
///
/// Unclosed paragraphs are cut where an HTML parser would close them
/// implicitly.
pub fn extract_paragraphs(html: &str) -> Vec<String> {
    let html = SCRIPT_STYLE.replace_all(html, "");
    let mut paragraphs = Vec::new();
    let mut pos = 0;
    while let Some(open) = PARAGRAPH_OPEN.find_at(&html, pos) {
        let start = open.end();
        let end = PARAGRAPH_END
            .find_at(&html, start)
            .map_or(html.len(), |m| m.start());
        paragraphs.push(inner_text(&html[start..end]).trim().to_string());
        pos = end;
    }
    paragraphs
}

/// Build a document from a fetched page.
///
/// Paragraphs are joined with single spaces and cleaned; the word count is
/// taken from the cleaned body.
pub fn parse_page(url: &str, html: &str) -> Document {
    let title = extract_title(html).unwrap_or_else(|| UNTITLED.to_string());
    let body = clean_scraped_text(&extract_paragraphs(html).join(" "));
    Document::new(title, body).with_url(url)
}

/// Collapse whitespace and drop characters other than word characters,
/// whitespace and `.,;:!?¿¡-`
pub fn clean_scraped_text(text: &str) -> String {
    let text = NEWLINES.replace_all(text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = DISALLOWED.replace_all(&text, "");
    text.trim().to_string()
}

/// Decode named (common subset) and numeric character references
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
        })
        .into_owned()
}

/// Block tags become a space so adjacent words stay apart; inline tags vanish
fn inner_text(fragment: &str) -> String {
    let spaced = BLOCK_TAG.replace_all(fragment, " ");
    decode_entities(&TAG.replace_all(&spaced, ""))
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "aacute" => 'á',
        "eacute" => 'é',
        "iacute" => 'í',
        "oacute" => 'ó',
        "uacute" => 'ú',
        "Aacute" => 'Á',
        "Eacute" => 'É',
        "Iacute" => 'Í',
        "Oacute" => 'Ó',
        "Uacute" => 'Ú',
        "ntilde" => 'ñ',
        "Ntilde" => 'Ñ',
        "uuml" => 'ü',
        "Uuml" => 'Ü',
        "iquest" => '¿',
        "iexcl" => '¡',
        "laquo" => '«',
        "raquo" => '»',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head><title>ignored</title>
        <style>p { color: red; }</style>
        <script>var p = "<p>not a paragraph</p>";</script></head>
        <body>
          <h1 class="main">Inteligencia <em>Artificial</em></h1>
          <h1>Second heading</h1>
          <p>La IA &amp; el aprendizaje   automático.</p>
          <div><p class="x">
            Segundo   párrafo con <a href="/x">enlace</a>.
          </p></div>
          <pre>not a paragraph either</pre>
        </body></html>"#;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(PAGE).as_deref(), Some("Inteligencia Artificial"));
        assert_eq!(extract_title("<p>no heading</p>"), None);
    }

    #[test]
    fn test_extract_paragraphs() {
        let paragraphs = extract_paragraphs(PAGE);
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0], "La IA & el aprendizaje   automático.");
        assert_eq!(paragraphs[1], "Segundo   párrafo con enlace.");
    }

    #[test]
    fn test_extract_unclosed_paragraphs() {
        let html = "<div><p>Primero texto</div><p>Segundo texto</p><p>uno<p>dos</p>";
        assert_eq!(
            extract_paragraphs(html),
            vec!["Primero texto", "Segundo texto", "uno", "dos"]
        );

        let doc = parse_page("u", html);
        assert_eq!(doc.text, "Primero texto Segundo texto uno dos");
        assert_eq!(doc.word_count, 6);
    }

    #[test]
    fn test_unclosed_paragraph_stops_at_block() {
        let html = "<p>antes de la tabla<table><tr><td>celda</td></tr></table><p>final";
        assert_eq!(extract_paragraphs(html), vec!["antes de la tabla", "final"]);
    }

    #[test]
    fn test_line_breaks_keep_words_apart() {
        assert_eq!(
            extract_paragraphs("<p>uno<br>dos<br/>tres <b>cuatro</b>s</p>"),
            vec!["uno dos tres cuatros"]
        );
    }

    #[test]
    fn test_parse_page() {
        let doc = parse_page("https://example.com/ia", PAGE);
        assert_eq!(doc.title, "Inteligencia Artificial");
        assert_eq!(
            doc.text,
            "La IA  el aprendizaje automático. Segundo párrafo con enlace."
        );
        assert_eq!(doc.word_count, 9);
        assert_eq!(doc.url.as_deref(), Some("https://example.com/ia"));
    }

    #[test]
    fn test_parse_page_without_heading() {
        let doc = parse_page("u", "<p>solo texto</p>");
        assert_eq!(doc.title, UNTITLED);
        assert_eq!(doc.word_count, 2);
    }

    #[test]
    fn test_clean_scraped_text() {
        assert_eq!(
            clean_scraped_text("  ¿Qué\n\npasa?  ¡Hola! (nota) #tag 50% -ok-  "),
            "¿Qué pasa? ¡Hola! nota tag 50 -ok-"
        );
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &#241; &#xF1; &ntilde;"), "a <b> ñ ñ ñ");
        assert_eq!(decode_entities("&unknown; &"), "&unknown; &");
    }
}
