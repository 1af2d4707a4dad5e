use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for a published event, carrying stream metadata.
///
/// Notes:
/// - `stream` names the catalog section the event belongs to (e.g. `"items"`),
///   or `"assemblies"` for ledger-only facts.
/// - `sequence_number` increases monotonically per publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    stream: String,

    /// Monotonically increasing position in the publisher's output.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, stream: impl Into<String>, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id,
            stream: stream.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
