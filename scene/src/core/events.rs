//! Ordered listener registry
//!
//! Replaces ad hoc delegate lists with an explicit registry: registration
//! returns a token, removal takes it back, delivery follows registration
//! order. There is no priority, cancellation, or deduplication; registering
//! the same closure twice delivers it twice.

/// Token identifying a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered collection of boxed listeners for one event type.
///
/// Listeners are `FnMut` closures delivered on the registering thread; the
/// registry is single-threaded by contract, like the systems that embed it.
pub struct ListenerSet<E> {
    next: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(&E)>)>,
}

impl<E> Default for ListenerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ListenerSet<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            next: 0,
            listeners: Vec::new(),
        }
    }

    /// Add a listener; the returned token removes it again.
    pub fn register(&mut self, listener: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener by token; `false` when the token is unknown.
    pub fn unregister(&mut self, id: ListenerId) -> bool {
        match self.listeners.iter().position(|(lid, _)| *lid == id) {
            Some(index) => {
                self.listeners.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every listener in registration order.
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
