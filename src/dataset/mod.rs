//! Dataset store
//!
//! Read-only canonical data for one session: documents, per-document
//! model output and projection coordinates, the dataset descriptor, and
//! the mined rule sets. Loaded once at startup; views hold references
//! and never mutate it.

mod bundle;
mod descriptor;
mod document;
mod errors;
mod model_output;
mod projection;

pub use bundle::DatasetBundle;
pub use descriptor::{DatasetDescriptor, DocKind};
pub use document::{parse_jsonl, Document};
pub use errors::{DatasetError, DatasetResult};
pub use model_output::{parse_model_output, ModelOutput};
pub use projection::{parse_projection, ProjectionPoint};
