//! Connectivity status.
//!
//! The surrounding application flips this on its platform's
//! online/offline events; subscribers typically trigger a queue sync on
//! the offline-to-online transition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

type OnlineListener = Box<dyn Fn(bool) + Send + Sync>;

/// Observable online/offline flag. Starts online.
pub struct OnlineStatus {
    online: AtomicBool,
    listeners: Mutex<Vec<OnlineListener>>,
}

impl Default for OnlineStatus {
    fn default() -> Self {
        Self {
            online: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl OnlineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Update the flag; listeners fire only on an actual transition.
    pub fn set_online(&self, online: bool) {
        let previous = self.online.swap(online, Ordering::SeqCst);
        if previous != online {
            tracing::debug!(online, "connectivity changed");
            for listener in self.listeners.lock().expect("status lock poisoned").iter() {
                listener(online);
            }
        }
    }

    /// Register an observer for connectivity transitions.
    pub fn subscribe(&self, listener: OnlineListener) {
        self.listeners
            .lock()
            .expect("status lock poisoned")
            .push(listener);
    }
}
