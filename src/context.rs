//! Test-context handles: failure reporting plus scoped teardown.
//!
//! Fixtures receive a [`ContextHandle`] through [`crate::AcceptsContext`]
//! and the builder registers the aggregate cleanup against it.

use std::cell::RefCell;
use std::rc::Rc;

use log::error;

/// Ambient context of the running test.
pub trait TestContext {
    /// Name of the test this context belongs to.
    fn name(&self) -> &str;

    /// Record a failure and keep going.
    fn error(&self, message: &str);

    /// Record a failure and stop the test.
    ///
    /// Implementations used by real tests do not return (they panic, which
    /// fails the test). Recording implementations may return, in which case
    /// the caller must abandon the current operation.
    fn fatal(&self, message: &str);

    /// Run `cleanup` when the test's scope ends.
    fn register_cleanup(&self, cleanup: Box<dyn FnOnce()>);

    /// Whether any failure has been recorded.
    fn failed(&self) -> bool;
}

/// Shared handle to the ambient test context.
pub type ContextHandle = Rc<dyn TestContext>;

struct ScopeState {
    name: String,
    failures: RefCell<Vec<String>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl TestContext for ScopeState {
    fn name(&self) -> &str {
        &self.name
    }

    fn error(&self, message: &str) {
        error!("[{}] {}", self.name, message);
        self.failures.borrow_mut().push(message.to_string());
    }

    fn fatal(&self, message: &str) {
        self.error(message);
        panic!("{}: {}", self.name, message);
    }

    fn register_cleanup(&self, cleanup: Box<dyn FnOnce()>) {
        self.cleanups.borrow_mut().push(cleanup);
    }

    fn failed(&self) -> bool {
        !self.failures.borrow().is_empty()
    }
}

/// Owner of a test's context. Registered cleanups run when it is dropped,
/// last registered first.
///
/// ```rust,no_run
/// use fixture_graph::{TestContext, TestScope};
///
/// let scope = TestScope::new("my_test");
/// let ctx = scope.handle();
/// ctx.register_cleanup(Box::new(|| println!("torn down")));
/// // cleanups run here, when `scope` goes out of scope
/// ```
pub struct TestScope {
    state: Rc<ScopeState>,
}

impl TestScope {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Rc::new(ScopeState {
                name: name.into(),
                failures: RefCell::new(Vec::new()),
                cleanups: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn handle(&self) -> ContextHandle {
        self.state.clone()
    }

    pub fn failures(&self) -> Vec<String> {
        self.state.failures.borrow().clone()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.state.cleanups.borrow().len()
    }

    /// Run and drain registered cleanups now instead of at drop.
    pub fn run_cleanups(&self) {
        // The borrow is released before each call so a cleanup may register
        // another one.
        loop {
            let next = self.state.cleanups.borrow_mut().pop();
            match next {
                Some(cleanup) => cleanup(),
                None => break,
            }
        }
    }
}

impl Drop for TestScope {
    fn drop(&mut self) {
        self.run_cleanups();
    }
}

/// Context that records everything and never aborts.
///
/// Cleanups are held until [`RecordingContext::replay_cleanups`] is called,
/// which lets a test observe fixture state before and after teardown.
pub struct RecordingContext {
    name: String,
    errors: RefCell<Vec<String>>,
    fatals: RefCell<Vec<String>>,
    cleanups: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl RecordingContext {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            errors: RefCell::new(Vec::new()),
            fatals: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
        })
    }

    pub fn handle(self: &Rc<Self>) -> ContextHandle {
        self.clone()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors.borrow().clone()
    }

    pub fn fatal_messages(&self) -> Vec<String> {
        self.fatals.borrow().clone()
    }

    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.borrow().len()
    }

    /// Run recorded cleanups in registration order and forget them.
    pub fn replay_cleanups(&self) {
        let cleanups = std::mem::take(&mut *self.cleanups.borrow_mut());
        for cleanup in cleanups {
            cleanup();
        }
    }
}

impl TestContext for RecordingContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn error(&self, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn fatal(&self, message: &str) {
        self.fatals.borrow_mut().push(message.to_string());
    }

    fn register_cleanup(&self, cleanup: Box<dyn FnOnce()>) {
        self.cleanups.borrow_mut().push(cleanup);
    }

    fn failed(&self) -> bool {
        !self.errors.borrow().is_empty() || !self.fatals.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_scope_runs_cleanups_last_first_on_drop() {
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let scope = TestScope::new("scope");
            let ctx = scope.handle();
            for label in ["first", "second"] {
                let order = Rc::clone(&order);
                ctx.register_cleanup(Box::new(move || order.borrow_mut().push(label)));
            }
            assert_eq!(scope.pending_cleanups(), 2);
            assert!(order.borrow().is_empty());
        }
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn test_scope_cleanup_may_register_another() {
        let ran = Rc::new(Cell::new(0));
        let scope = TestScope::new("nested");
        let ctx = scope.handle();
        let inner_ctx = scope.handle();
        let counter = Rc::clone(&ran);
        ctx.register_cleanup(Box::new(move || {
            counter.set(counter.get() + 1);
            let counter = Rc::clone(&counter);
            inner_ctx.register_cleanup(Box::new(move || counter.set(counter.get() + 1)));
        }));

        scope.run_cleanups();
        assert_eq!(ran.get(), 2);
        assert_eq!(scope.pending_cleanups(), 0);
    }

    #[test]
    fn test_scope_error_marks_failed() {
        let scope = TestScope::new("failing");
        let ctx = scope.handle();
        assert!(!ctx.failed());
        ctx.error("boom");
        assert!(ctx.failed());
        assert_eq!(scope.failures(), vec!["boom".to_string()]);
    }

    #[test]
    #[should_panic(expected = "fatal_scope: stop here")]
    fn test_scope_fatal_panics() {
        let scope = TestScope::new("fatal_scope");
        scope.handle().fatal("stop here");
    }

    #[test]
    fn test_recording_context_replays_in_registration_order() {
        let recorder = RecordingContext::new("recorder");
        let ctx = recorder.handle();
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second"] {
            let order = Rc::clone(&order);
            ctx.register_cleanup(Box::new(move || order.borrow_mut().push(label)));
        }

        assert_eq!(recorder.pending_cleanups(), 2);
        recorder.replay_cleanups();
        assert_eq!(*order.borrow(), vec!["first", "second"]);
        assert_eq!(recorder.pending_cleanups(), 0);
    }

    #[test]
    fn test_recording_context_fatal_returns() {
        let recorder = RecordingContext::new("recorder");
        recorder.fatal("not a handle");
        assert!(recorder.failed());
        assert_eq!(recorder.fatal_messages(), vec!["not a handle".to_string()]);
        assert!(recorder.error_messages().is_empty());
    }
}
