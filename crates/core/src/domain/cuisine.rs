use std::fmt;

use serde::{Serialize, Serializer};

/// Filter used when nothing in the message names a cuisine.
pub const FALLBACK_CUISINE: &str = "restaurant";

/// One or more backend cuisine tags, rendered as a `;`-joined string.
///
/// Tags are lower-cased, stripped to `[a-z0-9_ -]` and de-duplicated in first
/// occurrence order. An empty tag set collapses to [`FALLBACK_CUISINE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CuisineFilter(Vec<String>);

impl CuisineFilter {
    pub fn fallback() -> Self {
        Self(vec![FALLBACK_CUISINE.to_string()])
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for tag in tags {
            for part in tag.as_ref().split(';') {
                let clean = sanitize_tag(part);
                if !clean.is_empty() && !normalized.contains(&clean) {
                    normalized.push(clean);
                }
            }
        }

        if normalized.is_empty() {
            Self::fallback()
        } else {
            Self(normalized)
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::from_tags([raw])
    }

    pub fn tags(&self) -> &[String] {
        &self.0
    }

    pub fn is_fallback(&self) -> bool {
        self.0.len() == 1 && self.0[0] == FALLBACK_CUISINE
    }

    /// Alternation pattern for a regex tag match, e.g. `indian|mexican|thai`.
    pub fn overpass_pattern(&self) -> String {
        self.0.join("|")
    }
}

impl Default for CuisineFilter {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Display for CuisineFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(";"))
    }
}

impl Serialize for CuisineFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn sanitize_tag(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | ' ' | '-'))
        .collect::<String>()
        .trim()
        .to_string()
}
