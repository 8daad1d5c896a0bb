pub mod document;
pub mod options;
pub mod registry;

pub use document::{Assignments, AttributeMap, Document};
pub use options::{FieldOptions, Scope, Step};
pub use registry::{Registry, ResolvedOptions, TypeConfig};
