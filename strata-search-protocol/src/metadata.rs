//! Facet token codec.
//!
//! A facet bucket's composite identity (a chain of `id`/`name` pairs) is
//! carried as one flat string used as the bucket key in the remote
//! aggregation response. Pairs flatten to `key##value` fragments joined by
//! `~~`:
//!
//! ```text
//! id##5~~name##Shoes~~level##2
//! ```
//!
//! The codec is the only place that knows this layout; counter resolution
//! consumes it through [`encode`] and [`decode`] so the scheme can change
//! without touching aggregation logic.

use std::collections::BTreeMap;

/// Separator between `key##value` fragments.
const ENTRY_SEPARATOR: &str = "~~";

/// Separator between a fragment's key and value.
const PAIR_SEPARATOR: &str = "##";

/// Encode ordered key/value pairs into a flat facet token.
pub fn encode<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}{PAIR_SEPARATOR}{value}"))
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

/// Decode a facet token into its key/value map.
///
/// Fragments without a `##` are assigned positional integer keys. A token
/// made of exactly one positional fragment is the degenerate single-value
/// facet and decodes as `{id: value, name: value}`. Returns `None` for an
/// empty token or when no `id` key is present after these rules; that is
/// the signal that a bucket string is not a valid facet token.
pub fn decode(token: &str) -> Option<BTreeMap<String, String>> {
    if token.is_empty() {
        return None;
    }

    let mut values = BTreeMap::new();
    let mut positional = 0usize;
    let mut fragments = 0usize;
    let mut last_element = "";
    let mut last_was_positional = false;

    for fragment in token.split(ENTRY_SEPARATOR) {
        fragments += 1;
        match fragment.split_once(PAIR_SEPARATOR) {
            Some((key, value)) => {
                last_element = value;
                last_was_positional = false;
                values.insert(key.to_string(), value.to_string());
            }
            None => {
                last_element = fragment;
                last_was_positional = true;
                values.insert(positional.to_string(), fragment.to_string());
                positional += 1;
            }
        }
    }

    if fragments == 1 && last_was_positional {
        values = BTreeMap::from([
            ("id".to_string(), last_element.to_string()),
            ("name".to_string(), last_element.to_string()),
        ]);
    }

    if !values.contains_key("id") {
        return None;
    }

    Some(values)
}
