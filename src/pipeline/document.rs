//! Document assembly
//!
//! A document is the collection of column entries sharing one uid within a
//! shard row, grouped by field name. Field values stay as JSON values; the
//! serialization used for transmission is the host's concern.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::uid::Uid;
use crate::waitwindow::YieldPoint;

/// Uid carried by synthetic overrun placeholder documents.
const OVERRUN_PLACEHOLDER_UID: &str = "WAIT_WINDOW_OVERRUN";

/// A fully assembled document, or the synthetic placeholder produced when
/// a wait window overruns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    uid: Uid,
    fields: BTreeMap<String, Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    overrun: Option<YieldPoint>,
}

impl Document {
    /// Creates an empty document for `uid`.
    pub fn new(uid: Uid) -> Self {
        Self {
            uid,
            fields: BTreeMap::new(),
            overrun: None,
        }
    }

    /// Appends one field value; fields are multi-valued.
    pub fn put(&mut self, field: impl Into<String>, value: Value) {
        self.fields.entry(field.into()).or_default().push(value);
    }

    /// The document uid.
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Values recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[Value]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// All fields in name order.
    pub fn fields(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.fields
    }

    /// Number of distinct fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields were collected.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Synthetic placeholder emitted instead of a real match when a wait
    /// window overruns. Never produced by document assembly; the yield
    /// point tells the host where to resume.
    pub fn overrun_placeholder(yield_point: YieldPoint) -> Self {
        Self {
            uid: Uid::from_validated(OVERRUN_PLACEHOLDER_UID.to_string()),
            fields: BTreeMap::new(),
            overrun: Some(yield_point),
        }
    }

    /// True for the synthetic overrun placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.overrun.is_some()
    }

    /// The resume checkpoint, present only on placeholders.
    pub fn yield_point(&self) -> Option<&YieldPoint> {
        self.overrun.as_ref()
    }
}
