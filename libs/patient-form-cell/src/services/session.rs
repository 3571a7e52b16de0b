use std::collections::HashMap;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::events::FormEvent;
use crate::models::{FormActionResponse, FormState, InputChanges};
use crate::services::builder::FormSettings;
use crate::services::controller::PatientFormController;

/// A live controller plus the receiving end of its event channel.
pub struct FormSession {
    id: Uuid,
    pub controller: PatientFormController,
    events: UnboundedReceiver<FormEvent>,
}

impl FormSession {
    pub fn new(id: Uuid, settings: FormSettings) -> Self {
        let (sender, events) = unbounded_channel();
        Self {
            id,
            controller: PatientFormController::new(settings, Box::new(sender)),
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn drain_events(&mut self) -> Vec<FormEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub fn state(&self) -> FormState {
        FormState {
            id: self.id,
            title: self.controller.title().to_string(),
            mode: self.controller.mode(),
            access: self.controller.access(),
            valid: self.controller.is_valid(),
            value: self.controller.value(),
            errors: self.controller.errors(),
        }
    }

    /// Current state plus whatever the last operation emitted.
    pub fn respond(&mut self) -> FormActionResponse {
        FormActionResponse {
            state: self.state(),
            events: self.drain_events(),
        }
    }
}

pub struct FormSessionStore {
    settings: FormSettings,
    sessions: Mutex<HashMap<Uuid, FormSession>>,
}

impl FormSessionStore {
    pub fn new(settings: FormSettings) -> Self {
        Self {
            settings,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn create(&self, changes: InputChanges) -> FormActionResponse {
        let id = Uuid::new_v4();
        let mut session = FormSession::new(id, self.settings.clone());
        session.controller.apply_inputs(changes);
        let response = session.respond();

        self.sessions.lock().await.insert(id, session);
        debug!("Form session {} created", id);
        response
    }

    /// Runs `f` against the session while holding the store lock.
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut FormSession) -> R) -> Option<R> {
        let mut sessions = self.sessions.lock().await;
        sessions.get_mut(&id).map(f)
    }

    pub async fn state(&self, id: Uuid) -> Option<FormState> {
        self.sessions.lock().await.get(&id).map(FormSession::state)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            debug!("Form session {} discarded", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionMode, FormMode};

    #[tokio::test]
    async fn test_create_and_discard_session() {
        let store = FormSessionStore::new(FormSettings::default());
        let response = store
            .create(InputChanges {
                title: Some("New Patient".to_string()),
                mode: Some(FormMode::Create),
                ..InputChanges::default()
            })
            .await;

        assert_eq!(response.state.title, "New Patient");
        assert!(response.events.is_empty());
        assert_eq!(store.len().await, 1);

        assert!(store.remove(response.state.id).await);
        assert!(!store.remove(response.state.id).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_events_are_drained_once() {
        let store = FormSessionStore::new(FormSettings::default());
        let id = store.create(InputChanges::default()).await.state.id;

        let events = store
            .with_session(id, |session| {
                session.controller.submit_action(ActionMode::Save);
                session.drain_events()
            })
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], FormEvent::ActionMode(ActionMode::Save));

        let again = store.with_session(id, FormSession::drain_events).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = FormSessionStore::new(FormSettings::default());
        assert!(store.state(Uuid::new_v4()).await.is_none());
        assert!(store.with_session(Uuid::new_v4(), |_| ()).await.is_none());
    }
}
