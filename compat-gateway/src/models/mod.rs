mod document;
mod identity;
pub mod schema;

pub use document::{list_envelope, Attributes, CollectionPath, Document, DocumentPath};
pub use identity::{Identity, EMULATOR_TOKEN};
