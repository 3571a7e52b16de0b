use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::models::{ActionMode, PatientFormValue};

/// Notifications the controller sends to its host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum FormEvent {
    /// Resolved mode of a submission, sent before the record.
    ActionMode(ActionMode),
    /// Finalized form snapshot.
    Patient(PatientFormValue),
    /// The view should scroll back to the top.
    ScrollToTop,
}

pub trait FormEventSink: Send + Sync {
    fn emit(&self, event: FormEvent);
}

impl FormEventSink for UnboundedSender<FormEvent> {
    fn emit(&self, event: FormEvent) {
        if self.send(event).is_err() {
            warn!("Form event dropped: receiver is gone");
        }
    }
}
