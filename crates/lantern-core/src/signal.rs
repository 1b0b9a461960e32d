//! Typed listener lists for engine events
//!
//! Signals are the notification backbone of the engine: asset loaders report
//! progress and completion, the scene graph reports topology changes, and the
//! scene manager reports frame boundaries. A `Signal<T>` is a plain struct
//! owned by whoever emits it; listeners are boxed closures called in
//! connection order with a shared reference to the payload.

use crate::SlotId;

struct Listener<T> {
    slot: SlotId,
    once: bool,
    callback: Box<dyn FnMut(&T)>,
}

/// An ordered list of listeners invoked on [`Signal::emit`].
pub struct Signal<T> {
    listeners: Vec<Listener<T>>,
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Signal<T> {
    /// Create a signal with no listeners
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Connect a listener. Returns a slot id usable with [`Signal::disconnect`].
    pub fn connect<F: FnMut(&T) + 'static>(&mut self, callback: F) -> SlotId {
        let slot = SlotId::new();
        self.listeners.push(Listener {
            slot,
            once: false,
            callback: Box::new(callback),
        });
        slot
    }

    /// Connect a listener that is dropped after its first invocation
    pub fn connect_once<F: FnMut(&T) + 'static>(&mut self, callback: F) -> SlotId {
        let slot = SlotId::new();
        self.listeners.push(Listener {
            slot,
            once: true,
            callback: Box::new(callback),
        });
        slot
    }

    /// Remove a listener. Returns false if the slot was already disconnected.
    pub fn disconnect(&mut self, slot: SlotId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.slot != slot);
        self.listeners.len() != before
    }

    /// Invoke every listener, in connection order, with `arg`.
    ///
    /// `connect_once` listeners are removed after the call.
    pub fn emit(&mut self, arg: &T) {
        for listener in &mut self.listeners {
            (listener.callback)(arg);
        }
        self.listeners.retain(|l| !l.once);
    }

    /// Number of connected listeners
    pub fn num_listeners(&self) -> usize {
        self.listeners.len()
    }
}
