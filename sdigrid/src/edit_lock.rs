//! Single-editor mutual exclusion.
//!
//! An [`EditLock`] is a cheap shared handle. Grids that should never have two
//! editors open at once are given clones of the same lock; a grid created
//! without one gets a private lock.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{GridError, Result};

/// Identity of something that can hold the edit lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerId(usize);

impl ControllerId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

/// Something owning an open editor.
pub trait EditController {
    fn controller_id(&self) -> ControllerId;

    /// Commits the open edit. Returns true when no edit remains open.
    fn commit_current_edit(&mut self) -> bool;

    /// Discards the open edit. Returns true when no edit remains open.
    fn cancel_current_edit(&mut self) -> bool;
}

/// Shared edit lock.
#[derive(Debug, Clone, Default)]
pub struct EditLock {
    holder: Rc<Cell<Option<ControllerId>>>,
}

impl EditLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any controller holds the lock.
    pub fn is_active(&self) -> bool {
        self.holder.get().is_some()
    }

    /// Whether `controller` holds the lock.
    pub fn is_held_by(&self, controller: ControllerId) -> bool {
        self.holder.get() == Some(controller)
    }

    pub fn holder(&self) -> Option<ControllerId> {
        self.holder.get()
    }

    /// Takes the lock. Re-activating by the current holder is a no-op.
    pub fn activate(&self, controller: ControllerId) -> Result<()> {
        match self.holder.get() {
            Some(current) if current != controller => Err(GridError::LockHeld),
            _ => {
                self.holder.set(Some(controller));
                Ok(())
            }
        }
    }

    /// Releases the lock. Only the holder may release it.
    pub fn deactivate(&self, controller: ControllerId) -> Result<()> {
        if self.holder.get() != Some(controller) {
            return Err(GridError::NotLockHolder);
        }
        self.holder.set(None);
        Ok(())
    }

    /// Asks the holder to commit. True when nothing is being edited.
    pub fn commit_current_edit(&self, controller: &mut dyn EditController) -> bool {
        match self.holder.get() {
            None => true,
            Some(id) if id == controller.controller_id() => controller.commit_current_edit(),
            Some(_) => false,
        }
    }

    /// Asks the holder to cancel. True when nothing is being edited.
    pub fn cancel_current_edit(&self, controller: &mut dyn EditController) -> bool {
        match self.holder.get() {
            None => true,
            Some(id) if id == controller.controller_id() => controller.cancel_current_edit(),
            Some(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        id: ControllerId,
        lock: EditLock,
        commit_ok: bool,
    }

    impl EditController for Stub {
        fn controller_id(&self) -> ControllerId {
            self.id
        }

        fn commit_current_edit(&mut self) -> bool {
            if self.commit_ok {
                let _ = self.lock.deactivate(self.id);
            }
            self.commit_ok
        }

        fn cancel_current_edit(&mut self) -> bool {
            let _ = self.lock.deactivate(self.id);
            true
        }
    }

    #[test]
    fn test_activate_twice_by_other_fails() {
        let lock = EditLock::new();
        let a = ControllerId::next();
        let b = ControllerId::next();
        lock.activate(a).unwrap();
        assert_eq!(lock.activate(b), Err(GridError::LockHeld));
        assert!(lock.activate(a).is_ok());
    }

    #[test]
    fn test_deactivate_requires_holder() {
        let lock = EditLock::new();
        let a = ControllerId::next();
        let b = ControllerId::next();
        lock.activate(a).unwrap();
        assert_eq!(lock.deactivate(b), Err(GridError::NotLockHolder));
        lock.deactivate(a).unwrap();
        assert!(!lock.is_active());
    }

    #[test]
    fn test_commit_without_active_edit_succeeds() {
        let lock = EditLock::new();
        let mut stub = Stub {
            id: ControllerId::next(),
            lock: lock.clone(),
            commit_ok: false,
        };
        assert!(lock.commit_current_edit(&mut stub));
    }

    #[test]
    fn test_commit_delegates_to_holder() {
        let lock = EditLock::new();
        let mut stub = Stub {
            id: ControllerId::next(),
            lock: lock.clone(),
            commit_ok: false,
        };
        lock.activate(stub.id).unwrap();
        assert!(!lock.commit_current_edit(&mut stub));
        assert!(lock.is_held_by(stub.id));

        stub.commit_ok = true;
        assert!(lock.commit_current_edit(&mut stub));
        assert!(!lock.is_active());
    }

    #[test]
    fn test_clones_share_state() {
        let lock = EditLock::new();
        let other = lock.clone();
        let a = ControllerId::next();
        lock.activate(a).unwrap();
        assert!(other.is_active());
        assert!(lock.cancel_current_edit(&mut Stub {
            id: a,
            lock: other,
            commit_ok: true,
        }));
        assert!(!lock.is_active());
    }
}
