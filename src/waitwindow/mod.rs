//! Cooperative wait-window protocol
//!
//! A hosting scan process grants each call into the pipeline a bounded
//! time/work budget. When the budget runs out mid-scan, the pipeline
//! surfaces a typed overrun instead of failing, and the overseer converts
//! it into a single placeholder document carrying the resume point. The
//! host re-issues `seek()` with the indicated range to continue; no result
//! is lost or duplicated across the checkpoint.
//!
//! # Invariants
//!
//! - Exactly one placeholder per overrun, consumed once
//! - After the placeholder is consumed, state is back to normal
//! - Only budget exhaustion is converted; every other condition propagates

mod observer;
mod overseer;

pub use observer::{WaitWindowObserver, YieldPoint};
pub use overseer::WaitWindowOverseer;
