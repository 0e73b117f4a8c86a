//! Text source collaborator interface.
//!
//! Indices never load text themselves. Whoever owns the files (a directory
//! walker, a daily-log parser, a test fixture) implements [`TextSource`] and
//! hands documents over as plain values.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A raw document supplied by a collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Unique document id (uniqueness is the source's responsibility)
    pub id: String,
    /// Raw UTF-8 text
    pub text: String,
    /// Optional display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional document type (e.g. "md", "daily-log")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    /// Optional origin path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Optional precomputed embedding (opaque to this engine)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// Opaque metadata carried through to hybrid results
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            title: None,
            doc_type: None,
            path: None,
            embedding: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// True when the text contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Supplies raw documents to the indices.
pub trait TextSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Load every document currently available from this source.
    fn load(&self) -> Result<Vec<SourceDocument>, MemoryError>;
}

/// A [`TextSource`] over documents already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    name: String,
    documents: Vec<SourceDocument>,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, documents: Vec<SourceDocument>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    /// Build a source from `(id, text)` pairs.
    pub fn from_pairs<I, K, V>(name: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let documents = pairs
            .into_iter()
            .map(|(id, text)| SourceDocument::new(id, text))
            .collect();
        Self::new(name, documents)
    }

    pub fn push(&mut self, document: SourceDocument) {
        self.documents.push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl TextSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Vec<SourceDocument>, MemoryError> {
        Ok(self.documents.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_document_builder() {
        let doc = SourceDocument::new("notes/a.md", "hello world")
            .with_title("a")
            .with_doc_type("md")
            .with_metadata("pinned", serde_json::json!(true));

        assert_eq!(doc.id, "notes/a.md");
        assert_eq!(doc.title.as_deref(), Some("a"));
        assert_eq!(doc.doc_type.as_deref(), Some("md"));
        assert_eq!(doc.metadata["pinned"], serde_json::json!(true));
        assert!(!doc.is_blank());
    }

    #[test]
    fn test_blank_document() {
        assert!(SourceDocument::new("x", "  \n\t ").is_blank());
        assert!(SourceDocument::new("x", "").is_blank());
    }

    #[test]
    fn test_static_source_from_pairs() {
        let source = StaticSource::from_pairs("fixture", [("d1", "one"), ("d2", "two")]);
        assert_eq!(source.name(), "fixture");
        assert_eq!(source.len(), 2);

        let docs = source.load().unwrap();
        assert_eq!(docs[0].id, "d1");
        assert_eq!(docs[1].text, "two");
    }

    #[test]
    fn test_source_document_serialization_skips_empty() {
        let doc = SourceDocument::new("d1", "text");
        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(json, r#"{"id":"d1","text":"text"}"#);

        let decoded: SourceDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, doc);
    }
}
