//! Hierarchical document addressing and the response envelope.
//!
//! A collection path alternates collection names and document ids:
//! `apps/{appId}/agents`. Documents are addressed by their parent
//! collection plus an id.

use serde_json::{json, Map, Value};
use std::fmt;

/// Schema-less document attributes
pub type Attributes = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Top-level collection
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// Subcollection nested under this document
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}/{}", self.collection.0, self.id, name))
    }

    pub fn parent(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document: generated id plus its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Attributes,
}

impl Document {
    /// `{id, ...attrs}`. A stored `id` attribute wins over the generated one,
    /// matching what legacy callers already receive.
    pub fn into_envelope(self) -> Value {
        let mut obj = Map::with_capacity(self.data.len() + 1);
        obj.insert("id".to_string(), Value::String(self.id));
        obj.extend(self.data);
        Value::Object(obj)
    }
}

/// `{items: [...]}`
pub fn list_envelope(docs: Vec<Document>) -> Value {
    let items: Vec<Value> = docs.into_iter().map(Document::into_envelope).collect();
    json!({ "items": items })
}
