//! Entry point: turns a root fixture into a wired graph plus its aggregate
//! setup and cleanup.

use std::any::type_name;
use std::rc::Rc;

use tracing::debug;

use crate::classify::{Classifier, FieldInfo};
use crate::config::BuildConfig;
use crate::context::ContextHandle;
use crate::error::{log_build_error, BuildError};
use crate::fixture::{Fixture, Shared};
use crate::lifecycle::{Cleanup, Cleanups, Setups};
use crate::walker::Walker;

/// Something that can be passed as the root of a build.
///
/// Only `Shared<T>` roots are walked. A fixture passed by value is accepted
/// by the type system but rejected at build time through the context's fatal
/// path, since fields populated on a moved value would be lost to the caller.
pub trait Root: Sized {
    type Node: Fixture;

    fn handle(&self) -> Option<&Shared<Self::Node>>;
}

impl<T: Fixture> Root for Shared<T> {
    type Node = T;

    fn handle(&self) -> Option<&Shared<T>> {
        Some(self)
    }
}

impl<T: Fixture> Root for T {
    type Node = T;

    fn handle(&self) -> Option<&Shared<T>> {
        None
    }
}

/// Result of [`FixtureBuilder::build_detached`]: nothing is registered with
/// the context, the caller owns both aggregates.
pub struct Built<R> {
    pub root: R,
    pub setup: Setups,
    pub cleanup: Cleanups,
    /// Type names of the fixtures this build allocated, in allocation order.
    pub created: Vec<&'static str>,
}

/// Configurable form of [`crate::build`].
///
/// ```rust
/// use fixture_graph::{shared, FixtureBuilder, Fixture, Setup, TestScope};
///
/// #[derive(Default)]
/// struct Stub;
/// impl Fixture for Stub {}
///
/// let scope = TestScope::new("doc");
/// let (root, mut setup) = FixtureBuilder::new(scope.handle())
///     .with_include(|field| field.name != "skipped")
///     .build(shared(Stub));
/// setup.setup();
/// # drop(root);
/// ```
pub struct FixtureBuilder {
    context: ContextHandle,
    include: Option<Classifier>,
    config: BuildConfig,
}

impl FixtureBuilder {
    pub fn new(context: ContextHandle) -> Self {
        Self {
            context,
            include: None,
            config: BuildConfig::default(),
        }
    }

    /// Replace the designator-suffix policy with a custom predicate.
    pub fn with_include<F>(mut self, include: F) -> Self
    where
        F: Fn(&FieldInfo) -> bool + 'static,
    {
        self.include = Some(Box::new(include));
        self
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    /// Wire `root`, register the aggregate cleanup with the context and
    /// return the root with the aggregate setup, which the caller invokes.
    pub fn build<R: Root>(&self, root: R) -> (R, Setups) {
        match self.assemble(&root) {
            Some((setup, mut cleanup, _)) => {
                self.context
                    .register_cleanup(Box::new(move || cleanup.cleanup()));
                (root, setup)
            }
            None => (root, Setups::new()),
        }
    }

    /// Like [`FixtureBuilder::build`] but leaves teardown timing to the
    /// caller: the cleanup aggregate is returned instead of registered.
    pub fn build_detached<R: Root>(&self, root: R) -> Built<R> {
        let (setup, cleanup, created) = self
            .assemble(&root)
            .unwrap_or_else(|| (Setups::new(), Cleanups::new(), Vec::new()));
        Built {
            root,
            setup,
            cleanup,
            created,
        }
    }

    fn assemble<R: Root>(&self, root: &R) -> Option<(Setups, Cleanups, Vec<&'static str>)> {
        let Some(handle) = root.handle() else {
            let err = BuildError::RootNotShared {
                type_name: type_name::<R>(),
            };
            log_build_error(&err, self.context.name());
            self.context.fatal(&err.to_string());
            return None;
        };

        let mut walker = Walker::new(
            Rc::clone(&self.context),
            self.include.as_deref(),
            &self.config,
        );
        let lifecycle = walker.walk_handle(Some(handle));
        let created = walker.created();
        debug!(
            root = type_name::<R::Node>(),
            created = created.len(),
            "fixture graph built"
        );

        let mut setup = Setups::new();
        setup.push(lifecycle.setup);
        let mut cleanup = Cleanups::new();
        cleanup.push(lifecycle.cleanup);
        Some((setup, cleanup, created))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RecordingContext, TestScope};
    use crate::fixture::shared;
    use crate::lifecycle::Setup;
    use crate::walker::Fields;

    #[derive(Default)]
    struct CounterFixture {
        setups: u32,
        cleanups: u32,
    }

    impl Setup for CounterFixture {
        fn setup(&mut self) {
            self.setups += 1;
        }
    }

    impl Cleanup for CounterFixture {
        fn cleanup(&mut self) {
            self.cleanups += 1;
        }
    }

    impl Fixture for CounterFixture {
        fn as_setup(&mut self) -> Option<&mut dyn Setup> {
            Some(self)
        }

        fn as_cleanup(&mut self) -> Option<&mut dyn Cleanup> {
            Some(self)
        }
    }

    #[derive(Default)]
    struct Harness {
        counter: Option<Shared<CounterFixture>>,
    }

    impl Fixture for Harness {
        fn visit(fields: &mut Fields<'_, '_, Self>) {
            fields.handle("counter", |f| &mut f.counter);
        }
    }

    #[test]
    fn test_build_registers_cleanup_with_context() {
        let recorder = RecordingContext::new("register");
        let (root, mut setup) =
            FixtureBuilder::new(recorder.handle()).build(shared(Harness::default()));
        setup.setup();

        assert_eq!(recorder.pending_cleanups(), 1);
        let counter = root.borrow().counter.clone().expect("allocated");
        assert_eq!(counter.borrow().setups, 1);
        assert_eq!(counter.borrow().cleanups, 0);

        recorder.replay_cleanups();
        assert_eq!(counter.borrow().cleanups, 1);
    }

    #[test]
    fn test_scope_drop_runs_cleanup() {
        let counter;
        {
            let scope = TestScope::new("scoped");
            let (root, mut setup) = crate::build(&scope.handle(), shared(Harness::default()));
            setup.setup();
            counter = root.borrow().counter.clone().expect("allocated");
            assert_eq!(counter.borrow().cleanups, 0);
        }
        assert_eq!(counter.borrow().cleanups, 1);
    }

    #[test]
    fn test_value_root_is_fatal_and_untouched() {
        let recorder = RecordingContext::new("value_root");
        let (root, mut setup) = FixtureBuilder::new(recorder.handle()).build(Harness::default());
        setup.setup();

        assert!(root.counter.is_none());
        assert!(setup.is_empty());
        assert_eq!(recorder.pending_cleanups(), 0);
        let fatals = recorder.fatal_messages();
        assert_eq!(fatals.len(), 1);
        assert!(fatals[0].contains("shared handle"));
        assert!(fatals[0].contains("Harness"));
    }

    #[test]
    #[should_panic(expected = "fixture root must be a shared handle")]
    fn test_value_root_fails_test_scope() {
        let scope = TestScope::new("value_root_scope");
        let _ = crate::build(&scope.handle(), Harness::default());
    }

    #[test]
    fn test_build_detached_leaves_teardown_to_caller() {
        let recorder = RecordingContext::new("detached");
        let Built {
            root,
            mut setup,
            mut cleanup,
            created,
        } = FixtureBuilder::new(recorder.handle()).build_detached(shared(Harness::default()));

        assert_eq!(recorder.pending_cleanups(), 0);
        assert_eq!(created.len(), 1);
        assert!(created[0].ends_with("CounterFixture"));

        setup.setup();
        cleanup.cleanup();
        let counter = root.borrow().counter.clone().expect("allocated");
        assert_eq!(counter.borrow().setups, 1);
        assert_eq!(counter.borrow().cleanups, 1);
    }

    #[test]
    fn test_registries_do_not_leak_between_builds() {
        let recorder = RecordingContext::new("independent");
        let builder = FixtureBuilder::new(recorder.handle());
        let (first, _) = builder.build(shared(Harness::default()));
        let (second, _) = builder.build(shared(Harness::default()));

        let a = first.borrow().counter.clone().expect("allocated");
        let b = second.borrow().counter.clone().expect("allocated");
        assert!(!Rc::ptr_eq(&a, &b));
    }
}
