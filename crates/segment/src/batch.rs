//! Batch of single-event requests sent in one call.

use crate::envelope::{Envelope, EnvelopeAware};
use crate::types::Request;
use crate::Error;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Identify, track, page, screen and group calls sent together.
///
/// Members are serialized in the order they were added, each tagged with
/// its `type`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    envelope: Envelope,
    batch: Vec<Request>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request.
    ///
    /// Alias and nested batch requests are rejected; members added earlier
    /// stay in the batch.
    pub fn add_request(&mut self, request: impl Into<Request>) -> Result<&mut Self, Error> {
        let request = request.into();
        if request.resource().batch_tag().is_none() {
            return Err(Error::InvalidBatchRequest {
                kind: request.kind(),
            });
        }

        self.batch.push(request);
        Ok(self)
    }

    pub fn requests(&self) -> &[Request] {
        &self.batch
    }

    pub fn len(&self) -> usize {
        self.batch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    pub fn to_payload(&self) -> Map<String, Value> {
        let members = self
            .batch
            .iter()
            .filter_map(|request| {
                let tag = request.resource().batch_tag()?;
                let mut member = Map::new();
                member.insert("type".into(), Value::String(tag.into()));
                member.extend(request.to_payload());
                Some(Value::Object(member))
            })
            .collect();

        let mut payload = self.envelope.to_payload();
        payload.insert("batch".into(), Value::Array(members));
        payload
    }
}

impl EnvelopeAware for Batch {
    fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    fn envelope_mut(&mut self) -> &mut Envelope {
        &mut self.envelope
    }
}

impl Serialize for Batch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}
