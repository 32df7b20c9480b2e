//! Combination extraction from thread pages
//!
//! Scans the post bodies of a fetched page for combination lines of the
//! form `Blade N-M Bit` and produces structured [`Combination`] records.
//! Abbreviated bit names are expanded through an injected [`Translations`]
//! table before whitespace normalization.

mod translations;

pub use translations::Translations;

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One winning combination as posted in the thread.
///
/// The `page` field records which thread page the combination was found on;
/// windowed reports resolve it to a date through the page cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    /// Blade name, whitespace removed
    #[serde(rename = "Blade")]
    pub blade: String,

    /// Ratchet designation, e.g. "1-60"
    #[serde(rename = "Ratchet")]
    pub ratchet: String,

    /// Bit name, translated and whitespace removed
    #[serde(rename = "Bit")]
    pub bit: String,

    /// Thread page the combination was scraped from
    #[serde(rename = "Page")]
    pub page: u32,
}

/// Combination grammar: a run of words, a ratchet (`\d+-\d+`), then a run
/// of words lazily extended up to a terminator. The terminator (newline,
/// comma, open paren, or end of input) is consumed rather than asserted
/// with a lookahead, which the regex engine does not support; since every
/// terminator also separates combinations, adjacent matches are unaffected.
const COMBINATION_PATTERN: &str = r"([A-Za-z]+(?:[ \t]+[A-Za-z]+)*)[ \t]+(\d+-\d+)([A-Za-z]+(?:[ \t]+[A-Za-z]+)*?)[ \t]*(?:\r?\n|,|\(|$)";

fn combination_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(COMBINATION_PATTERN).expect("combination pattern is valid"))
}

/// Extract the text of each post body on a page.
///
/// Falls back to the whole document when no post bodies are present, so a
/// page saved without forum chrome still yields its combinations.
fn post_body_texts(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("div.post_body") {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to parse post body selector: {}", e);
            return Vec::new();
        }
    };

    let texts: Vec<String> = document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect();

    if texts.is_empty() {
        vec![document.root_element().text().collect::<String>()]
    } else {
        texts
    }
}

/// Extract all combinations from a page's HTML, tagged with its page number
pub fn extract_combinations(
    html: &str,
    page: u32,
    translations: &Translations,
) -> Vec<Combination> {
    let re = combination_regex();
    let mut combinations = Vec::new();

    for text in post_body_texts(html) {
        for caps in re.captures_iter(&text) {
            let blade = caps[1].trim();
            let ratchet = caps[2].trim();
            let bit = translations.apply(caps[3].trim());

            let blade = blade.replace(' ', "");
            let ratchet = ratchet.replace(' ', "");
            let bit = bit.replace(' ', "");

            if blade.is_empty() || ratchet.is_empty() || bit.is_empty() {
                continue;
            }
            if blade.contains('\n') || ratchet.contains('\n') || bit.contains('\n') {
                continue;
            }

            combinations.push(Combination {
                blade,
                ratchet,
                bit,
                page,
            });
        }
    }

    combinations
}
