//! Change notifications from the tree controller to the host binding.
//!
//! The host's tree view has exactly one consumer of "data changed" events,
//! so the publisher holds a single subscriber slot instead of a listener
//! list. Subscribing again replaces the previous subscriber. Everything runs
//! on the host's single interaction thread; callbacks execute to completion
//! on the emitting call.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::node::NodeId;

/// What changed: the whole tree, or one subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    /// Everything may have changed; the host should re-render from the root.
    All,
    /// Only the subtree under this node changed.
    Node(NodeId),
}

/// Subscription handle that clears the slot when dropped.
///
/// Disposer pattern: hold this value to keep receiving events, drop it to
/// unsubscribe.
pub struct Subscription {
    publisher: Weak<ChangePublisher>,
    generation: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(publisher) = self.publisher.upgrade() {
            publisher.unsubscribe(self.generation);
        }
    }
}

/// Single-slot publisher for [`TreeChange`] events.
///
/// Wrap in `Rc` to enable subscriptions.
pub struct ChangePublisher {
    slot: RefCell<Option<(u64, Rc<dyn Fn(&TreeChange)>)>>,
    next_generation: Cell<u64>,
}

impl Default for ChangePublisher {
    fn default() -> Self {
        Self {
            slot: RefCell::new(None),
            next_generation: Cell::new(0),
        }
    }
}

impl ChangePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback` as the subscriber, replacing any previous one.
    /// Returns a `Subscription` that clears the slot on drop.
    pub fn subscribe(self: &Rc<Self>, callback: impl Fn(&TreeChange) + 'static) -> Subscription {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        *self.slot.borrow_mut() = Some((generation, Rc::new(callback)));
        Subscription {
            publisher: Rc::downgrade(self),
            generation,
        }
    }

    /// Clear the slot, but only if it still holds the matching subscription.
    /// A stale handle must not tear down its replacement.
    fn unsubscribe(&self, generation: u64) {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|(g, _)| *g == generation) {
            *slot = None;
        }
    }

    /// Deliver `change` to the subscriber, if any.
    pub fn emit(&self, change: &TreeChange) {
        // Clone out of the slot before calling so a callback that
        // resubscribes does not hit a borrow conflict.
        let callback = self.slot.borrow().as_ref().map(|(_, cb)| Rc::clone(cb));
        if let Some(callback) = callback {
            callback(change);
        }
    }

    pub fn has_subscriber(&self) -> bool {
        self.slot.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_and_emit() {
        let publisher = Rc::new(ChangePublisher::new());
        let received: Rc<RefCell<Vec<TreeChange>>> = Rc::new(RefCell::new(Vec::new()));

        let received_clone = Rc::clone(&received);
        let _sub = publisher.subscribe(move |change| {
            received_clone.borrow_mut().push(change.clone());
        });

        publisher.emit(&TreeChange::All);
        let id = NodeId::generate();
        publisher.emit(&TreeChange::Node(id.clone()));

        let seen = received.borrow();
        assert_eq!(*seen, vec![TreeChange::All, TreeChange::Node(id)]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let publisher = Rc::new(ChangePublisher::new());
        let count = Rc::new(Cell::new(0u32));

        {
            let count_clone = Rc::clone(&count);
            let _sub = publisher.subscribe(move |_| count_clone.set(count_clone.get() + 1));
            publisher.emit(&TreeChange::All);
            assert_eq!(count.get(), 1);
        }

        publisher.emit(&TreeChange::All);
        assert_eq!(count.get(), 1);
        assert!(!publisher.has_subscriber());
    }

    #[test]
    fn test_resubscribe_replaces_slot() {
        let publisher = Rc::new(ChangePublisher::new());
        let first = Rc::new(Cell::new(0u32));
        let second = Rc::new(Cell::new(0u32));

        let first_clone = Rc::clone(&first);
        let stale = publisher.subscribe(move |_| first_clone.set(first_clone.get() + 1));
        let second_clone = Rc::clone(&second);
        let _sub = publisher.subscribe(move |_| second_clone.set(second_clone.get() + 1));

        publisher.emit(&TreeChange::All);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);

        // Dropping the replaced handle must not clear the live subscriber.
        drop(stale);
        publisher.emit(&TreeChange::All);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn test_emit_without_subscriber_is_noop() {
        let publisher = Rc::new(ChangePublisher::new());
        publisher.emit(&TreeChange::All);
        assert!(!publisher.has_subscriber());
    }
}
