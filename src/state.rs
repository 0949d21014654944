use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::services::{RenderRequest, ScheduleEditor};

/// A render request tagged with the editing session it came from.
#[derive(Clone, Debug, Serialize)]
pub struct RenderEvent {
    pub session: Uuid,
    #[serde(flatten)]
    pub request: RenderRequest,
}

#[derive(Clone, Debug)]
pub enum SessionEvent {
    Render(RenderEvent),
    /// The session was discarded or expired. Subscribers should stop listening.
    Closed(Uuid),
}

impl SessionEvent {
    pub fn session(&self) -> Uuid {
        match self {
            SessionEvent::Render(event) => event.session,
            SessionEvent::Closed(id) => *id,
        }
    }
}

pub struct Session {
    pub editor: ScheduleEditor,
    pub last_touched: DateTime<Utc>,
}

impl Session {
    pub fn new(editor: ScheduleEditor, now: DateTime<Utc>) -> Self {
        Self {
            editor,
            last_touched: now,
        }
    }
}

pub struct AppState {
    pub config: AppConfig,
    pub sessions: Mutex<HashMap<Uuid, Session>>,
    pub events_tx: broadcast::Sender<SessionEvent>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let (events_tx, _) = broadcast::channel(config.render_channel_capacity);
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
            events_tx,
        }
    }

    pub fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn open_session(&self, editor: ScheduleEditor) -> Uuid {
        let id = Uuid::new_v4();
        self.lock_sessions()
            .insert(id, Session::new(editor, Utc::now()));
        id
    }

    /// Runs `f` against a live session and marks it as recently used.
    pub fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut ScheduleEditor) -> R) -> Option<R> {
        let mut sessions = self.lock_sessions();
        let session = sessions.get_mut(&id)?;
        session.last_touched = Utc::now();
        Some(f(&mut session.editor))
    }

    pub fn publish(&self, event: SessionEvent) {
        // Ignore if no receivers
        let _ = self.events_tx.send(event);
    }

    /// Drops a session and tells its subscribers. Returns false if it was unknown.
    pub fn close_session(&self, id: Uuid) -> bool {
        let removed = self.lock_sessions().remove(&id).is_some();
        if removed {
            self.publish(SessionEvent::Closed(id));
        }
        removed
    }

    /// Closes every session untouched for longer than the configured TTL.
    pub fn sweep_idle(&self, now: DateTime<Utc>) -> Vec<Uuid> {
        let cutoff = now - Duration::minutes(self.config.session_ttl_minutes);
        let expired: Vec<Uuid> = {
            let mut sessions = self.lock_sessions();
            let expired: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, s)| s.last_touched < cutoff)
                .map(|(id, _)| *id)
                .collect();
            for id in &expired {
                sessions.remove(id);
            }
            expired
        };

        for id in &expired {
            tracing::info!(session = %id, "idle schedule session expired");
            self.publish(SessionEvent::Closed(*id));
        }
        expired
    }
}
