//! Test helpers for code built on siox.
//!
//! Enable with the `test-harness` feature:
//!
//! ```toml
//! [dev-dependencies]
//! siox = { version = "0.1", features = ["test-harness"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! let transport = RecordingTransport::new();
//! message.emit(&transport, EmitOptions::to_room("r1"), Msg { text: "hi".into() })?;
//!
//! assert_eq!(1, transport.count());
//! assert_eq!(transport.to_room("r1").len(), 1);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Emission, Result, Transport};

/// A [`Transport`] that keeps every emission in memory.
///
/// Cheap to clone; clones share the recorded emissions.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    emissions: Arc<Mutex<Vec<Emission>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All emissions, oldest first.
    pub fn emissions(&self) -> Vec<Emission> {
        self.emissions.lock().clone()
    }

    pub fn last(&self) -> Option<Emission> {
        self.emissions.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.emissions.lock().len()
    }

    /// Emissions of the event with the given name.
    pub fn named(&self, event: &str) -> Vec<Emission> {
        self.filtered(|e| &*e.event == event)
    }

    /// Emissions targeted at the given room.
    pub fn to_room(&self, room: &str) -> Vec<Emission> {
        self.filtered(|e| e.room.as_deref() == Some(room))
    }

    pub fn clear(&self) {
        self.emissions.lock().clear();
    }

    fn filtered(&self, predicate: impl Fn(&Emission) -> bool) -> Vec<Emission> {
        self.emissions
            .lock()
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }
}

impl Transport for RecordingTransport {
    fn emit(&self, emission: Emission) -> Result<()> {
        self.emissions.lock().push(emission);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EmitOptions;
    use serde_json::Value;

    #[test]
    fn test_records_and_filters() {
        let transport = RecordingTransport::new();
        let clone = transport.clone();
        transport
            .emit(Emission::new("a".into(), Value::Null, EmitOptions::to_room("r1")))
            .unwrap();
        clone
            .emit(Emission::new("b".into(), Value::Null, EmitOptions::default()))
            .unwrap();

        assert_eq!(transport.count(), 2);
        assert_eq!(transport.named("a").len(), 1);
        assert_eq!(transport.to_room("r1").len(), 1);
        assert_eq!(&*transport.last().unwrap().event, "b");

        transport.clear();
        assert_eq!(clone.count(), 0);
    }
}
