//! Per-application mutual exclusion.
//!
//! Lifecycle calls against the same application must not interleave their
//! chart operations or record writes. Each call holds an [`ApplicationLock`]
//! for its whole duration. Dropping the guard releases the lock, so every exit
//! path (including `?` and panics) unlocks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::application::ApplicationId;

use super::types::LifecycleError;

type Slots = Arc<Mutex<HashMap<ApplicationId, Arc<AsyncMutex<()>>>>>;

/// Registry of per-application locks.
///
/// Slots are created on demand and removed once nobody holds or waits on them.
#[derive(Debug, Clone, Default)]
pub struct ApplicationLocks {
  slots: Slots,
}

/// Held lock for one application.
#[derive(Debug)]
pub struct ApplicationLock {
  id: ApplicationId,
  guard: Option<OwnedMutexGuard<()>>,
  slots: Slots,
}

impl ApplicationLocks {
  pub fn new() -> Self {
    Self::default()
  }

  /// Acquire the lock for `id`, waiting at most `timeout` if given.
  ///
  /// Fails with [`LifecycleError::Busy`] when the wait times out.
  pub async fn acquire(&self, id: ApplicationId, timeout: Option<Duration>) -> Result<ApplicationLock, LifecycleError> {
    let slot = {
      let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
      slots.entry(id).or_default().clone()
    };

    let guard = match timeout {
      Some(limit) => match tokio::time::timeout(limit, slot.lock_owned()).await {
        Ok(guard) => guard,
        Err(_) => {
          release_slot(&self.slots, id);
          return Err(LifecycleError::Busy(id));
        }
      },
      None => slot.lock_owned().await,
    };

    debug!(application = %id, "application lock acquired");
    Ok(ApplicationLock {
      id,
      guard: Some(guard),
      slots: self.slots.clone(),
    })
  }
}

impl Drop for ApplicationLock {
  fn drop(&mut self) {
    // The guard owns a clone of the slot; drop it before checking for waiters.
    drop(self.guard.take());
    release_slot(&self.slots, self.id);
    debug!(application = %self.id, "application lock released");
  }
}

/// Remove the slot for `id` if the registry holds the only reference.
fn release_slot(slots: &Slots, id: ApplicationId) {
  let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
  if slots.get(&id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
    slots.remove(&id);
  }
}
