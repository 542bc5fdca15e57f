//! Background polling listener

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use super::DeviceListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Menu-level input produced by the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Navigate(Direction),
    Confirm,
    Back,
    Menu,
    DeviceConnected(usize),
    DeviceDisconnected(usize),
}

/// Source of input events, polled from the listener thread.
pub trait DevicePoller {
    /// Append events received since the last poll.
    fn poll(&mut self, events: &mut Vec<InputEvent>);

    /// Drop events queued while the listener was suspended, so presses meant
    /// for the emulator are not replayed in the menu.
    fn discard_pending(&mut self) {
        let mut ignored = Vec::new();
        self.poll(&mut ignored);
    }
}

#[derive(Debug, Default)]
struct Shared {
    running: AtomicBool,
    shutdown: AtomicBool,
}

/// Polls a [`DevicePoller`] on a dedicated thread while running.
///
/// The poller is built on the listener thread itself, since some backends
/// cannot move between threads.
#[derive(Debug)]
pub struct PollingListener {
    shared: Arc<Shared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl PollingListener {
    /// Spawn the listener thread. It starts in the running state.
    ///
    /// If `make_poller` returns `None` the thread exits immediately and the
    /// listener behaves as permanently idle.
    pub fn spawn<F, P>(make_poller: F, interval: Duration, events: Sender<InputEvent>) -> Self
    where
        F: FnOnce() -> Option<P> + Send + 'static,
        P: DevicePoller,
    {
        let shared = Arc::new(Shared::default());
        shared.running.store(true, Ordering::SeqCst);

        let thread_shared = Arc::clone(&shared);
        let spawned = std::thread::Builder::new()
            .name("romhub-input".into())
            .spawn(move || {
                let Some(mut poller) = make_poller() else {
                    debug!("No input devices available; listener idle");
                    return;
                };
                poll_loop(&mut poller, &thread_shared, interval, &events);
            });

        let thread = match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to spawn input listener thread: {}", e);
                None
            }
        };

        Self {
            shared,
            thread: Mutex::new(thread),
        }
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::SeqCst);
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && handle.join().is_err()
        {
            warn!("Input listener thread panicked");
        }
    }
}

fn poll_loop<P: DevicePoller>(
    poller: &mut P,
    shared: &Shared,
    interval: Duration,
    events: &Sender<InputEvent>,
) {
    let mut was_running = true;
    let mut batch = Vec::new();

    while !shared.shutdown.load(Ordering::SeqCst) {
        let running = shared.running.load(Ordering::SeqCst);
        if running {
            if !was_running {
                poller.discard_pending();
            }
            poller.poll(&mut batch);
            for event in batch.drain(..) {
                if events.send(event).is_err() {
                    debug!("Input receiver dropped; listener exiting");
                    return;
                }
            }
        }
        was_running = running;
        std::thread::sleep(interval);
    }
}

impl DeviceListener for PollingListener {
    fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    fn start(&self) {
        self.shared.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }
}

impl Drop for PollingListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}
