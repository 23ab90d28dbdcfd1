//! shardscan - sharded index query evaluation core
//!
//! Evaluates boolean field-value predicates against a sharded, sorted
//! index and materializes matching documents:
//!
//! - `stream`: lazy sorted-merge algebra over per-predicate index streams
//! - `query`: boolean tree mirroring and combinator assembly
//! - `uid`: hierarchical document identifiers and family-aware dedup
//! - `pipeline`: resumable document iteration over the sorted store
//! - `waitwindow`: cooperative checkpoint/resume for time-sliced scans
//! - `observability`: structured scan-lifecycle logging
//!
//! Query parsing, physical storage, transport, and authorization are
//! external collaborators.

pub mod observability;
pub mod pipeline;
pub mod query;
pub mod stream;
pub mod uid;
pub mod waitwindow;
