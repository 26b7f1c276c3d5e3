//! Index settings and synonyms.

use serde::{Deserialize, Serialize};

use crate::wire;

/// A group of words the index treats as equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synonym {
    words: Vec<String>,
}

impl Synonym {
    /// Create a synonym group.
    pub fn by_words(words: Vec<String>) -> Self {
        Self { words }
    }

    /// The equivalent words.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The comma-joined expansion.
    pub fn expand(&self) -> String {
        self.words.join(",")
    }
}

/// Settings applied when creating or reconfiguring an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    #[serde(default = "wire::bool_true", skip_serializing_if = "wire::is_true")]
    store_searchable_metadata: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    synonyms: Vec<Synonym>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSettings {
    /// Create settings with defaults: no language, searchable metadata
    /// stored, no synonyms.
    pub fn new() -> Self {
        Self {
            language: None,
            store_searchable_metadata: true,
            synonyms: Vec::new(),
        }
    }

    /// Set the index language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Control whether searchable metadata is stored.
    pub fn store_searchable_metadata(mut self, store: bool) -> Self {
        self.store_searchable_metadata = store;
        self
    }

    /// Add a synonym group.
    pub fn with_synonym(mut self, synonym: Synonym) -> Self {
        self.synonyms.push(synonym);
        self
    }

    /// The index language.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Whether searchable metadata is stored.
    pub fn should_store_searchable_metadata(&self) -> bool {
        self.store_searchable_metadata
    }

    /// The synonym groups.
    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }
}
