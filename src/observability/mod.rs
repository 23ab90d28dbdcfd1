//! Observability for shardscan
//!
//! Structured JSON scan-lifecycle logging.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on scan execution
//! 3. No async or background threads
//! 4. Deterministic key ordering

mod logger;

pub use logger::{Logger, ScanLogger, Severity};
