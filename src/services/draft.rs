//! Draft autosave
//!
//! Keeps partially filled form input in the `form_drafts` table, keyed by
//! user and form type. Changes are debounced; a form whose fields are all
//! blank deletes its draft instead of saving it. Store failures are logged
//! and never reach the user.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::settings::DraftConfig;
use crate::database::repositories::DraftRepository;
use crate::models::draft::FormType;

/// Whether a form payload carries no input at all
///
/// Empty or whitespace strings, `false`, `null` and containers holding only
/// blanks count as blank. Numbers never do.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(_) => false,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.iter().all(is_blank),
        Value::Object(fields) => fields.values().all(is_blank),
    }
}

/// What the store is believed to hold for this form
#[derive(Debug, Clone, PartialEq, Eq)]
enum Stored {
    Unknown,
    Absent,
    Saved(String),
}

#[derive(Debug, Clone)]
enum DraftOp {
    Save { payload: Value, serialized: String },
    Delete,
}

struct Pending {
    generation: u64,
    op: DraftOp,
    handle: JoinHandle<()>,
}

struct AutosaveState {
    stored: Stored,
    pending: Option<Pending>,
    generation: u64,
}

impl AutosaveState {
    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}

/// Debounced draft persistence for one form instance
///
/// Only one save is ever pending; each change cancels it and schedules a new
/// one. Store writes run one at a time, so `flush` and `clear` wait for a save
/// that already left the timer.
#[derive(Clone)]
pub struct DraftAutosave {
    repository: DraftRepository,
    user_id: String,
    form_type: FormType,
    debounce: Duration,
    enabled: bool,
    state: Arc<Mutex<AutosaveState>>,
    writes: Arc<tokio::sync::Mutex<()>>,
}

impl std::fmt::Debug for DraftAutosave {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftAutosave")
            .field("user_id", &self.user_id)
            .field("form_type", &self.form_type)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl DraftAutosave {
    pub fn new(repository: DraftRepository, config: &DraftConfig, user_id: impl Into<String>, form_type: FormType) -> Self {
        Self {
            repository,
            user_id: user_id.into(),
            form_type,
            debounce: Duration::from_millis(config.debounce_ms),
            enabled: config.enabled,
            state: Arc::new(Mutex::new(AutosaveState {
                stored: Stored::Unknown,
                pending: None,
                generation: 0,
            })),
            writes: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub fn form_type(&self) -> &FormType {
        &self.form_type
    }

    fn lock(&self) -> MutexGuard<'_, AutosaveState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the saved draft once, on mount
    ///
    /// A missing row, an unreadable payload and a store error all give `None`.
    pub async fn hydrate<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.enabled {
            return None;
        }

        match self.repository.fetch(&self.user_id, &self.form_type).await {
            Ok(Some(draft)) => {
                let serialized = draft.payload.to_string();
                match serde_json::from_value::<T>(draft.payload) {
                    Ok(form) => {
                        self.lock().stored = Stored::Saved(serialized);
                        debug!(user_id = %self.user_id, form_type = %self.form_type, "Draft restored");
                        Some(form)
                    }
                    Err(e) => {
                        warn!(user_id = %self.user_id, form_type = %self.form_type, error = %e, "Ignoring unreadable draft");
                        None
                    }
                }
            }
            Ok(None) => {
                self.lock().stored = Stored::Absent;
                None
            }
            Err(e) => {
                warn!(user_id = %self.user_id, form_type = %self.form_type, error = %e, "Failed to load draft");
                None
            }
        }
    }

    /// Record the current form content and schedule a save or delete
    pub fn watch<T: Serialize>(&self, form: &T) {
        if !self.enabled {
            return;
        }

        let payload = match serde_json::to_value(form) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(form_type = %self.form_type, error = %e, "Failed to serialize draft");
                return;
            }
        };

        let mut state = self.lock();
        let op = if is_blank(&payload) {
            if state.stored == Stored::Absent {
                state.cancel_pending();
                return;
            }
            DraftOp::Delete
        } else {
            let serialized = payload.to_string();
            if state.stored == Stored::Saved(serialized.clone()) {
                state.cancel_pending();
                return;
            }
            if let Some(Pending { op: DraftOp::Save { serialized: queued, .. }, .. }) = &state.pending {
                if *queued == serialized {
                    return;
                }
            }
            DraftOp::Save { payload, serialized }
        };
        if matches!(op, DraftOp::Delete) && matches!(state.pending, Some(Pending { op: DraftOp::Delete, .. })) {
            return;
        }

        state.cancel_pending();
        state.generation += 1;
        let generation = state.generation;

        let autosave = self.clone();
        let delay = self.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _write = autosave.writes.lock().await;
            if let Some(op) = autosave.take_pending(generation) {
                autosave.apply(op).await;
            }
        });

        state.pending = Some(Pending { generation, op, handle });
    }

    fn take_pending(&self, generation: u64) -> Option<DraftOp> {
        let mut state = self.lock();
        match &state.pending {
            Some(pending) if pending.generation == generation => state.pending.take().map(|p| p.op),
            _ => None,
        }
    }

    async fn apply(&self, op: DraftOp) {
        match op {
            DraftOp::Save { payload, serialized } => {
                match self.repository.save(&self.user_id, &self.form_type, &payload).await {
                    Ok(_) => {
                        debug!(user_id = %self.user_id, form_type = %self.form_type, "Draft saved");
                        self.lock().stored = Stored::Saved(serialized);
                    }
                    Err(e) => {
                        warn!(user_id = %self.user_id, form_type = %self.form_type, error = %e, "Failed to save draft");
                    }
                }
            }
            DraftOp::Delete => match self.repository.delete(&self.user_id, &self.form_type).await {
                Ok(_) => {
                    debug!(user_id = %self.user_id, form_type = %self.form_type, "Blank draft removed");
                    self.lock().stored = Stored::Absent;
                }
                Err(e) => {
                    warn!(user_id = %self.user_id, form_type = %self.form_type, error = %e, "Failed to delete draft");
                }
            },
        }
    }

    /// Whether a save or delete is waiting on the debounce timer
    pub fn has_pending(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Run the pending save now instead of waiting for the timer
    ///
    /// Returns once every write scheduled so far has reached the store.
    pub async fn flush(&self) {
        let _write = self.writes.lock().await;
        let op = {
            let mut state = self.lock();
            state.pending.take().map(|pending| {
                pending.handle.abort();
                pending.op
            })
        };
        if let Some(op) = op {
            self.apply(op).await;
        }
    }

    /// Drop any pending save and delete the draft, after a successful submit
    pub async fn clear(&self) {
        let _write = self.writes.lock().await;
        self.lock().cancel_pending();
        match self.repository.delete(&self.user_id, &self.form_type).await {
            Ok(_) => self.lock().stored = Stored::Absent,
            Err(e) => {
                warn!(user_id = %self.user_id, form_type = %self.form_type, error = %e, "Failed to clear draft");
            }
        }
    }
}
