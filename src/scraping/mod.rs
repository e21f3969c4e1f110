//! Fetching articles from the web
//!
//! - `client` - HTTP fetching with a fixed delay between requests
//! - `html` - title and paragraph extraction from raw HTML

mod client;
mod html;

pub use client::WebScraper;
pub use html::{clean_scraped_text, decode_entities, extract_paragraphs, extract_title, parse_page};
