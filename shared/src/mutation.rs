//! Remote actions (create, cancel, complete, accept, reject) and what
//! happens to the bound list afterwards.
//!
//! Nothing is applied optimistically. A successful action reloads the bound
//! collection; a failed one leaves it untouched. Only one call per
//! `(action, target)` may be in flight, so a double tap on "Cancel" sends a
//! single cancellation.

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::capabilities::{ConfirmationPrompt, Mutator};
use crate::error::MutationError;

/// Something that can refetch itself after a mutation.
#[async_trait]
pub trait Reload: Send + Sync {
    async fn reload(&self);
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationKey {
    pub action: String,
    pub target: Option<String>,
}

impl fmt::Display for MutationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{}:{}", self.action, target),
            None => f.write_str(&self.action),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub action: String,
    pub payload: Value,
    pub target: Option<String>,
}

impl MutationRequest {
    /// The target defaults to the payload's `id` field, if it has one.
    pub fn new(action: impl Into<String>, payload: Value) -> Self {
        let target = target_from_payload(&payload);
        Self {
            action: action.into(),
            payload,
            target,
        }
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    #[must_use]
    pub fn key(&self) -> MutationKey {
        MutationKey {
            action: self.action.clone(),
            target: self.target.clone(),
        }
    }
}

fn target_from_payload(payload: &Value) -> Option<String> {
    match payload.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub struct Confirmation<'a> {
    prompt: &'a dyn ConfirmationPrompt,
    message: String,
}

pub struct PerformOptions<'a> {
    on_collection: &'a dyn Reload,
    confirm: Option<Confirmation<'a>>,
}

impl<'a> PerformOptions<'a> {
    pub fn new(on_collection: &'a dyn Reload) -> Self {
        Self {
            on_collection,
            confirm: None,
        }
    }

    /// Ask `prompt` before sending; a `false` answer abandons the action.
    #[must_use]
    pub fn confirm_with(mut self, prompt: &'a dyn ConfirmationPrompt, message: impl Into<String>) -> Self {
        self.confirm = Some(Confirmation {
            prompt,
            message: message.into(),
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MutationOutcome {
    /// The server accepted the action; carries its response body.
    Completed(Value),
    /// The user declined the confirmation. Nothing was sent.
    Declined,
}

/// Keys of the actions that have been started and not yet finished.
#[derive(Debug, Default)]
pub struct InFlightActions {
    keys: HashSet<MutationKey>,
}

impl InFlightActions {
    /// Claims `key`, or reports that the same action is already running.
    pub fn try_acquire(&mut self, key: MutationKey) -> Result<(), MutationError> {
        if self.keys.contains(&key) {
            return Err(MutationError::ConcurrencyRejected {
                action: key.action,
                target: key.target,
            });
        }
        self.keys.insert(key);
        Ok(())
    }

    /// Returns false if `key` was not held.
    pub fn release(&mut self, key: &MutationKey) -> bool {
        self.keys.remove(key)
    }

    #[must_use]
    pub fn contains(&self, key: &MutationKey) -> bool {
        self.keys.contains(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

type InFlight = Arc<Mutex<InFlightActions>>;

fn lock(in_flight: &InFlight) -> MutexGuard<'_, InFlightActions> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Releases the in-flight slot however `perform` exits.
#[derive(Debug)]
struct InFlightGuard {
    in_flight: InFlight,
    key: MutationKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).release(&self.key);
    }
}

pub struct MutationCoordinator<M> {
    mutator: Arc<M>,
    in_flight: InFlight,
}

impl<M: Mutator> MutationCoordinator<M> {
    pub fn new(mutator: Arc<M>) -> Self {
        Self {
            mutator,
            in_flight: Arc::new(Mutex::new(InFlightActions::default())),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &MutationKey) -> bool {
        lock(&self.in_flight).contains(key)
    }

    fn acquire(&self, key: MutationKey) -> Result<InFlightGuard, MutationError> {
        lock(&self.in_flight).try_acquire(key.clone())?;
        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            key,
        })
    }

    /// Runs one action. The slot for its key is held from before the
    /// confirmation until the bound collection has reloaded.
    #[instrument(skip_all, fields(action = %request.action, target = ?request.target))]
    pub async fn perform(
        &self,
        request: MutationRequest,
        options: PerformOptions<'_>,
    ) -> Result<MutationOutcome, MutationError> {
        let _guard = match self.acquire(request.key()) {
            Ok(guard) => guard,
            Err(rejected) => {
                debug!("rejected, same action already in flight");
                return Err(rejected);
            }
        };

        if let Some(confirmation) = &options.confirm {
            if !confirmation.prompt.confirm(&confirmation.message).await {
                debug!("declined by user");
                return Ok(MutationOutcome::Declined);
            }
        }

        match self.mutator.mutate(&request.action, &request.payload).await {
            Ok(response) => {
                info!("mutation succeeded, reloading collection");
                options.on_collection.reload().await;
                Ok(MutationOutcome::Completed(response))
            }
            Err(e) => {
                warn!(error = %e, "mutation failed");
                Err(e)
            }
        }
    }
}
