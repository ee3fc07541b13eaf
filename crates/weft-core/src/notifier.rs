//! Ordered before/after callback lists.
//!
//! A [`Notifier`] is the lifecycle-hook primitive used throughout the
//! toolkit: two ordered callback lists fired synchronously around a
//! mutation, on the calling thread.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the mutation a listener observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fired before the mutation, with the incoming value.
    Before,
    /// Fired after the mutation, with the applied value.
    After,
}

type Callback<T> = Box<dyn FnMut(&T)>;

/// An ordered broadcaster with a two-phase firing contract.
///
/// Listener ids are plain indices; removing a listener shifts the ids of
/// listeners added after it, so ids must not be cached across removals.
pub struct Notifier<T> {
    before: Vec<Callback<T>>,
    after: Vec<Callback<T>>,
}

impl<T> Default for Notifier<T> {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
        }
    }
}

impl<T> Notifier<T> {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list_mut(&mut self, phase: Phase) -> &mut Vec<Callback<T>> {
        match phase {
            Phase::Before => &mut self.before,
            Phase::After => &mut self.after,
        }
    }

    /// Append a listener to the given phase, returning its id.
    pub fn add(&mut self, phase: Phase, f: impl FnMut(&T) + 'static) -> usize {
        let list = self.list_mut(phase);
        list.push(Box::new(f));
        list.len() - 1
    }

    /// Remove the listener with the given id from the given phase.
    pub fn remove(&mut self, phase: Phase, id: usize) -> Result<()> {
        let list = self.list_mut(phase);
        if id >= list.len() {
            return Err(Error::InvalidListener { id, phase });
        }
        list.remove(id);
        Ok(())
    }

    /// Number of listeners registered for the given phase.
    #[must_use]
    pub fn len(&self, phase: Phase) -> usize {
        match phase {
            Phase::Before => self.before.len(),
            Phase::After => self.after.len(),
        }
    }

    /// Whether no listener is registered in either phase.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Invoke every listener of the given phase, in insertion order,
    /// synchronously on the calling thread. Listener panics propagate to
    /// the caller; nothing is swallowed.
    pub fn notify(&mut self, phase: Phase, arg: &T) {
        for f in self.list_mut(phase) {
            f(arg);
        }
    }
}

impl<T> fmt::Debug for Notifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("before", &self.before.len())
            .field("after", &self.after.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_phases_fire_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut n = Notifier::new();
        for tag in ["b0", "b1"] {
            let log = Rc::clone(&log);
            n.add(Phase::Before, move |v: &i32| log.borrow_mut().push((tag, *v)));
        }
        let log2 = Rc::clone(&log);
        n.add(Phase::After, move |v: &i32| log2.borrow_mut().push(("a0", *v)));

        n.notify(Phase::Before, &7);
        n.notify(Phase::After, &8);
        assert_eq!(*log.borrow(), vec![("b0", 7), ("b1", 7), ("a0", 8)]);
    }

    #[test]
    fn test_remove_shifts_later_ids() {
        let hits = Rc::new(RefCell::new(0));
        let mut n: Notifier<()> = Notifier::new();
        let h = Rc::clone(&hits);
        let first = n.add(Phase::After, move |()| *h.borrow_mut() += 1);
        let h = Rc::clone(&hits);
        n.add(Phase::After, move |()| *h.borrow_mut() += 10);

        n.remove(Phase::After, first).unwrap();
        n.notify(Phase::After, &());
        assert_eq!(*hits.borrow(), 10);
        assert_eq!(n.len(Phase::After), 1);
    }

    #[test]
    fn test_remove_out_of_range_is_an_error() {
        let mut n: Notifier<()> = Notifier::new();
        let err = n.remove(Phase::Before, 0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::InvalidListener {
                id: 0,
                phase: Phase::Before
            }
        ));
    }
}
