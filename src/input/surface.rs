//! Listener attachment seam between the controller and the host platform.

use std::{cell::RefCell, fmt, rc::Rc};

use super::event::{Disposition, EventKind, InputEvent};
use crate::error::CruiseError;

/// Callback invoked for every event of the kind it was registered for.
pub type EventHandler = Rc<dyn Fn(&InputEvent) -> Disposition>;

/// Opaque handle returned by [`InputSurface::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a platform-assigned identifier.
    #[must_use]
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Platform-assigned identifier.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Something that can deliver input events to handlers: a canvas plus its
/// window, a native window, or an in-memory registry.
///
/// Each [`EventKind`] knows its [`ListenerScope`](super::ListenerScope);
/// implementations attach key listeners globally and the rest to the
/// capturing element.
pub trait InputSurface {
    /// Attach `handler` for events of `kind`.
    fn listen(
        &mut self,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, CruiseError>;

    /// Detach a listener. Returns `false` if `id` was not attached.
    fn unlisten(&mut self, id: ListenerId) -> bool;
}

struct Listener {
    id: ListenerId,
    kind: EventKind,
    handler: EventHandler,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// In-memory [`InputSurface`] that dispatches events synchronously.
///
/// Clones share the same listener table, so a host can hand one clone to
/// the controller and keep another to feed events in. Used by the native
/// adapter, replay scripts and tests.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every handler registered for its kind, in
    /// registration order. Returns `PreventDefault` if any handler asked
    /// for it.
    pub fn dispatch(&self, event: &InputEvent) -> Disposition {
        let kind = event.kind();
        // Snapshot so handlers may (un)register without a borrow conflict.
        let handlers: Vec<EventHandler> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| Rc::clone(&l.handler))
            .collect();

        handlers
            .iter()
            .map(|handler| handler(event))
            .fold(Disposition::Default, |acc, d| {
                if d == Disposition::PreventDefault {
                    d
                } else {
                    acc
                }
            })
    }

    /// Total attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Attached listeners for one kind.
    #[must_use]
    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }
}

impl InputSurface for ListenerRegistry {
    fn listen(
        &mut self,
        kind: EventKind,
        handler: EventHandler,
    ) -> Result<ListenerId, CruiseError> {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry.listeners.push(Listener { id, kind, handler });
        Ok(id)
    }

    fn unlisten(&mut self, id: ListenerId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|l| l.id != id);
        registry.listeners.len() != before
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn counting_handler(
        count: &Rc<Cell<u32>>,
        disposition: Disposition,
    ) -> EventHandler {
        let count = Rc::clone(count);
        Rc::new(move |_| {
            count.set(count.get() + 1);
            disposition
        })
    }

    #[test]
    fn dispatch_reaches_matching_kind_only() {
        let mut registry = ListenerRegistry::new();
        let hits = Rc::new(Cell::new(0));
        let _ = registry
            .listen(EventKind::PointerUp, counting_handler(&hits, Disposition::Default))
            .unwrap();

        let _ = registry.dispatch(&InputEvent::PointerLeave);
        assert_eq!(hits.get(), 0);
        let _ = registry.dispatch(&InputEvent::PointerUp);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn any_prevent_default_wins() {
        let mut registry = ListenerRegistry::new();
        let hits = Rc::new(Cell::new(0));
        for disposition in [Disposition::PreventDefault, Disposition::Default] {
            let _ = registry
                .listen(EventKind::ContextMenu, counting_handler(&hits, disposition))
                .unwrap();
        }
        assert_eq!(
            registry.dispatch(&InputEvent::ContextMenu),
            Disposition::PreventDefault
        );
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn unlisten_detaches_once() {
        let mut registry = ListenerRegistry::new();
        let shared = registry.clone();
        let hits = Rc::new(Cell::new(0));
        let id = registry
            .listen(EventKind::PointerUp, counting_handler(&hits, Disposition::Default))
            .unwrap();
        assert_eq!(shared.listener_count_for(EventKind::PointerUp), 1);

        assert!(registry.unlisten(id));
        assert!(!registry.unlisten(id));
        let _ = shared.dispatch(&InputEvent::PointerUp);
        assert_eq!(hits.get(), 0);
        assert_eq!(shared.listener_count(), 0);
    }
}
