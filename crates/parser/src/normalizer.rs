//! Subject-line normalization.
//!
//! Produces a canonical layout that the grammars can match with single
//! spaces:
//!
//! ```text
//! #<id> <SIDE> <qty> <symbol> ... @<price>[ <EXCH>] MARK=<mark> IMPL VOL=<iv>% , ACCOUNT <account>
//! ```
//!
//! Normalization never fails; text that cannot be canonicalized is passed
//! through with collapsed whitespace.

use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static AT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*@\s*").unwrap());
// Price glued to the exchange code or MARK=, e.g. "@.12CBOEMARK=".
static GLUED_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\d[\d,]*(?:\.\d+)?|\.\d+)([A-Z])").unwrap());
static MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*MARK\s*=\s*").unwrap());
static IMPL_VOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*IMPL\s*VOL\s*=\s*").unwrap());
static ACCOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*%\s*,?\s*ACCOUNT\b\s*").unwrap());

/// Canonicalizes raw subject text.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Matches configured noise words (whole word, case-insensitive) sitting
    /// between the leading trade id and the side keyword.
    noise: Option<Regex>,
}

impl Normalizer {
    /// Create a normalizer that strips the given noise tokens.
    pub fn new<S: AsRef<str>>(noise_tokens: &[S]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = noise_tokens
            .iter()
            .map(|t| t.as_ref().trim())
            .filter(|t| !t.is_empty())
            .map(regex::escape)
            .collect();

        let noise = if alternatives.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"^(#\d+)\s+(?:(?i:{})\s+)+(BOT|SOLD)\b",
                alternatives.join("|")
            ))?)
        };

        Ok(Self { noise })
    }

    /// Normalize one subject line.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.trim().trim_matches('"').to_string();

        if let Some(noise) = &self.noise {
            text = noise.replace(&text, "${1} ${2}").into_owned();
        }

        text = WHITESPACE.replace_all(&text, " ").into_owned();
        text = AT.replace_all(&text, " @").into_owned();
        text = GLUED_PRICE.replace_all(&text, "@${1} ${2}").into_owned();
        text = MARK.replace_all(&text, " MARK=").into_owned();
        text = IMPL_VOL.replace_all(&text, " IMPL VOL=").into_owned();
        text = ACCOUNT.replace_all(&text, "% , ACCOUNT ").into_owned();

        WHITESPACE.replace_all(text.trim(), " ").into_owned()
    }
}
