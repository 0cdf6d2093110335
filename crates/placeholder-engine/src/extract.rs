//! Placeholder discovery and value seeding

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use shared_types::Template;

use crate::tokenizer::tokens;
use crate::FieldValues;

/// A distinct placeholder key and the default written for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Ordered, deduplicated placeholder collector
#[derive(Debug, Default)]
struct Collector {
    placeholders: Vec<Placeholder>,
    index: HashMap<String, usize>,
}

impl Collector {
    fn scan(&mut self, text: &str) {
        for token in tokens(text) {
            match self.index.get(token.key) {
                Some(&i) => {
                    // The first token that actually writes a default wins
                    let existing = &mut self.placeholders[i];
                    if existing.default.is_none() {
                        existing.default = token.default.map(str::to_string);
                    }
                }
                None => {
                    self.index
                        .insert(token.key.to_string(), self.placeholders.len());
                    self.placeholders.push(Placeholder {
                        key: token.key.to_string(),
                        default: token.default.map(str::to_string),
                    });
                }
            }
        }
    }
}

/// Distinct placeholders of `text` in first-occurrence order
pub fn extract_placeholders(text: &str) -> Vec<Placeholder> {
    let mut collector = Collector::default();
    collector.scan(text);
    collector.placeholders
}

/// Distinct placeholders across title, body, signer1 and signer2, in that order.
///
/// Fields are scanned independently, so a token never spans two fields.
pub fn extract_from_template(template: &Template) -> Vec<Placeholder> {
    let mut collector = Collector::default();
    for field in template.fields() {
        collector.scan(field);
    }
    collector.placeholders
}

/// Pre-fill blank values with placeholder defaults.
///
/// Keys with a non-empty value in `current` keep it; other keys from
/// `placeholders` get their default, or the empty string. Values for keys
/// that no longer appear in the template are carried over untouched.
pub fn seed_values(placeholders: &[Placeholder], current: &FieldValues) -> FieldValues {
    let mut seeded = current.clone();
    for placeholder in placeholders {
        let blank = seeded
            .get(&placeholder.key)
            .map_or(true, |value| value.is_empty());
        if blank {
            seeded.insert(
                placeholder.key.clone(),
                placeholder.default.clone().unwrap_or_default(),
            );
        }
    }
    seeded
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn key() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    proptest! {
        /// Property: keys come out in strictly increasing first-occurrence index
        #[test]
        fn keys_in_first_occurrence_order(
            keys in prop::collection::vec(key(), 0..12),
            filler in "[ a-z.,]{0,8}",
        ) {
            let text: String = keys
                .iter()
                .map(|k| format!("{}{{{{{}}}}}", filler, k))
                .collect();
            let found = extract_placeholders(&text);

            let positions: Vec<usize> = found
                .iter()
                .map(|p| text.find(&format!("{{{{{}}}}}", p.key)).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));

            let distinct: std::collections::HashSet<&String> = keys.iter().collect();
            prop_assert_eq!(found.len(), distinct.len());
        }

        /// Property: seeding never overwrites a non-empty value
        #[test]
        fn seeding_keeps_user_values(
            entries in prop::collection::hash_map(key(), "[a-z0-9]{0,5}", 0..8),
            defaults in prop::collection::vec((key(), prop::option::of("[a-z]{0,4}")), 0..8),
        ) {
            let placeholders: Vec<Placeholder> = defaults
                .into_iter()
                .map(|(key, default)| Placeholder { key, default })
                .collect();
            let current: FieldValues = entries.into_iter().collect();
            let seeded = seed_values(&placeholders, &current);

            for (k, v) in &current {
                if !v.is_empty() {
                    prop_assert_eq!(&seeded[k], v);
                }
            }
            for p in &placeholders {
                prop_assert!(seeded.contains_key(&p.key));
            }
        }
    }
}
