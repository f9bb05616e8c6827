//! Keyword-based cuisine intent extraction.
//!
//! The keyword table is an ordered, immutable value built once at startup and
//! handed to [`IntentExtractor`]. Every keyword that occurs in the message
//! contributes its tags, in table order, so "spicy taco" yields
//! `indian;mexican;thai`.

use serde::{Deserialize, Serialize};

use crate::domain::cuisine::CuisineFilter;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub tags: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

const DEFAULT_KEYWORDS: &[(&str, &str)] = &[
    ("pizza", "pizza"),
    ("burger", "burger"),
    ("sushi", "japanese"),
    ("chinese", "chinese"),
    ("indian", "indian"),
    ("mexican", "mexican"),
    ("spicy", "indian;mexican;thai"),
    ("romantic", "italian;french"),
    ("cheap", "fast_food"),
    ("coffee", "coffee_shop"),
    ("dessert", "ice_cream;bakery"),
    ("healthy", "vegetarian;vegan"),
    ("steak", "steakhouse"),
    ("seafood", "seafood"),
    ("pasta", "italian"),
    ("noodle", "asian"),
    ("taco", "mexican"),
];

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS
                .iter()
                .map(|(keyword, tags)| KeywordEntry {
                    keyword: (*keyword).to_string(),
                    tags: (*tags).to_string(),
                })
                .collect(),
        )
    }
}

impl KeywordTable {
    /// Keywords are lower-cased and blank keywords dropped; order is kept.
    pub fn new(entries: Vec<KeywordEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter_map(|entry| {
                let keyword = entry.keyword.trim().to_lowercase();
                (!keyword.is_empty()).then_some(KeywordEntry { keyword, tags: entry.tags })
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whole-word check for a single token; a trailing plural `s` is ignored.
    /// Unlike [`IntentExtractor::extract`] this never matches inside a longer
    /// word, so place names such as "Indianapolis" are not mistaken for cuisines.
    pub fn contains_keyword(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        let singular = token.strip_suffix('s');
        self.entries
            .iter()
            .any(|entry| token == entry.keyword || singular == Some(entry.keyword.as_str()))
    }
}

#[derive(Clone, Debug, Default)]
pub struct IntentExtractor {
    table: KeywordTable,
}

impl IntentExtractor {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    pub fn extract(&self, text: &str) -> CuisineFilter {
        let normalized = text.to_lowercase();
        let matched = self
            .table
            .entries
            .iter()
            .filter(|entry| normalized.contains(&entry.keyword))
            .map(|entry| entry.tags.as_str());

        CuisineFilter::from_tags(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::{IntentExtractor, KeywordEntry, KeywordTable};
    use crate::domain::cuisine::FALLBACK_CUISINE;

    #[test]
    fn single_keyword_maps_to_its_tag() {
        let extractor = IntentExtractor::default();

        assert_eq!(extractor.extract("I want PIZZA tonight").to_string(), "pizza");
        assert_eq!(extractor.extract("any sushi around?").to_string(), "japanese");
    }

    #[test]
    fn no_keyword_falls_back_to_restaurant() {
        let extractor = IntentExtractor::default();

        assert_eq!(extractor.extract("food in Paris").to_string(), FALLBACK_CUISINE);
        assert_eq!(extractor.extract("").to_string(), FALLBACK_CUISINE);
    }

    #[test]
    fn all_matches_are_collected_in_table_order_without_repeats() {
        let extractor = IntentExtractor::default();

        // taco precedes spicy in the message but follows it in the table.
        let filter = extractor.extract("taco place, something spicy and a romantic pasta");

        assert_eq!(filter.to_string(), "indian;mexican;thai;italian;french");
    }

    #[test]
    fn keywords_match_as_substrings() {
        let extractor = IntentExtractor::default();

        assert_eq!(extractor.extract("noodles and burgers").to_string(), "burger;asian");
    }

    #[test]
    fn injected_table_replaces_defaults() {
        let extractor = IntentExtractor::new(KeywordTable::new(vec![
            KeywordEntry { keyword: " Ramen ".to_string(), tags: "ramen".to_string() },
            KeywordEntry { keyword: "   ".to_string(), tags: "ignored".to_string() },
        ]));

        assert_eq!(extractor.table().len(), 1);
        assert_eq!(extractor.extract("ramen please").to_string(), "ramen");
        assert_eq!(extractor.extract("pizza please").to_string(), FALLBACK_CUISINE);
    }

    #[test]
    fn contains_keyword_detects_cuisine_words() {
        let table = KeywordTable::default();

        assert!(table.contains_keyword("Pizza"));
        assert!(table.contains_keyword("noodles"));
        assert!(table.contains_keyword("Burgers"));
        assert!(!table.contains_keyword("Paris"));
    }

    #[test]
    fn contains_keyword_does_not_match_inside_place_names() {
        let table = KeywordTable::default();

        assert!(!table.contains_keyword("Indianapolis"));
        assert!(!table.contains_keyword("Indiana"));
        assert!(!table.contains_keyword("Tacoma"));
        assert!(!table.contains_keyword("pizzeria"));
    }
}
