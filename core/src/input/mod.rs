//! Input device coordination
//!
//! The launcher's own input listener must not compete with a launched
//! emulator for controller focus. Each launch takes a [`SuspendGuard`]; the
//! first outstanding guard stops the listener (if it was running) and the
//! last one to drop restarts it. Overlapping launches therefore keep the
//! listener stopped until every one of them has finished.

#[cfg(feature = "gamepad")]
mod gamepad;
mod listener;

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

#[cfg(feature = "gamepad")]
pub use gamepad::GamepadPoller;
pub use listener::{DevicePoller, Direction, InputEvent, PollingListener};

/// A background listener that can be paused while a foreign process owns
/// the foreground.
pub trait DeviceListener: Send + Sync {
    fn is_running(&self) -> bool;
    fn start(&self);
    fn stop(&self);
}

#[derive(Debug, Default)]
struct SuspendState {
    outstanding: usize,
    /// The listener was running when the first guard was taken
    resume_on_release: bool,
}

/// Process-wide owner of the input listener's suspension state.
pub struct InputCoordinator {
    listener: Option<Arc<dyn DeviceListener>>,
    state: Mutex<SuspendState>,
}

impl std::fmt::Debug for InputCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputCoordinator")
            .field("has_listener", &self.listener.is_some())
            .field("state", &*self.lock())
            .finish()
    }
}

impl InputCoordinator {
    pub fn new(listener: Arc<dyn DeviceListener>) -> Arc<Self> {
        Arc::new(Self {
            listener: Some(listener),
            state: Mutex::new(SuspendState::default()),
        })
    }

    /// A coordinator with no listener; suspending is a no-op.
    pub fn detached() -> Arc<Self> {
        Arc::new(Self {
            listener: None,
            state: Mutex::new(SuspendState::default()),
        })
    }

    /// Suspend the listener until the returned guard (and every other
    /// outstanding guard) is dropped.
    pub fn suspend(self: &Arc<Self>) -> SuspendGuard {
        let mut state = self.lock();
        if state.outstanding == 0 {
            state.resume_on_release = false;
            if let Some(listener) = &self.listener
                && listener.is_running()
            {
                debug!("Suspending input listener");
                listener.stop();
                state.resume_on_release = true;
            }
        }
        state.outstanding += 1;
        SuspendGuard {
            coordinator: Arc::clone(self),
        }
    }

    /// Number of guards currently alive.
    pub fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    fn release(&self) {
        let mut state = self.lock();
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0
            && std::mem::take(&mut state.resume_on_release)
            && let Some(listener) = &self.listener
        {
            debug!("Resuming input listener");
            listener.start();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SuspendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps the input listener suspended while alive.
#[must_use = "the listener resumes as soon as the guard is dropped"]
#[derive(Debug)]
pub struct SuspendGuard {
    coordinator: Arc<InputCoordinator>,
}

impl Drop for SuspendGuard {
    fn drop(&mut self) {
        self.coordinator.release();
    }
}
