use std::cell::Cell;
use std::rc::Rc;

/// Rejects re-entrant calls into an operation that is already running.
///
/// The token returned by [`ReentryGuard::try_enter`] owns its own handle on
/// the flag, so the guarded owner can still be borrowed mutably while it is
/// held. Dropping the token clears the flag.
#[derive(Clone, Debug, Default)]
pub struct ReentryGuard {
    busy: Rc<Cell<bool>>,
}

#[derive(Debug)]
#[must_use = "the guard is released as soon as the token is dropped"]
pub struct GuardToken {
    busy: Rc<Cell<bool>>,
}

impl ReentryGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> Option<GuardToken> {
        if self.busy.replace(true) {
            return None;
        }
        Some(GuardToken {
            busy: Rc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}
