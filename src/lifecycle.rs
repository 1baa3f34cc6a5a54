//! Setup/cleanup capabilities and their ordered composites.
//!
//! Every visited node contributes zero or more hooks. The composites make
//! "zero or more things with a setup" look like a single thing with a setup,
//! so the walker composes the same way at every depth.

/// One-time initialization exposed by a fixture.
///
/// Implementations must be idempotent: a fixture embedded in another fixture
/// that also exposes setup is invoked once per level.
pub trait Setup {
    fn setup(&mut self);
}

/// Resource release exposed by a fixture.
pub trait Cleanup {
    fn cleanup(&mut self);
}

/// Inert hook pair used for nil subtrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullLifecycle;

impl Setup for NullLifecycle {
    fn setup(&mut self) {}
}

impl Cleanup for NullLifecycle {
    fn cleanup(&mut self) {}
}

/// Ordered list of setups that is itself a setup.
#[derive(Default)]
pub struct Setups {
    entries: Vec<Box<dyn Setup>>,
}

impl Setups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, setup: Box<dyn Setup>) {
        self.entries.push(setup);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Setup for Setups {
    fn setup(&mut self) {
        for entry in &mut self.entries {
            entry.setup();
        }
    }
}

impl std::fmt::Debug for Setups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setups")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Ordered list of cleanups that is itself a cleanup.
///
/// Entries run in the order they were appended, which is the setup order.
#[derive(Default)]
pub struct Cleanups {
    entries: Vec<Box<dyn Cleanup>>,
}

impl Cleanups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cleanup: Box<dyn Cleanup>) {
        self.entries.push(cleanup);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Cleanup for Cleanups {
    fn cleanup(&mut self) {
        for entry in &mut self.entries {
            entry.cleanup();
        }
    }
}

impl std::fmt::Debug for Cleanups {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cleanups")
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Composed setup and cleanup of one node and everything beneath it.
pub struct Lifecycle {
    pub setup: Box<dyn Setup>,
    pub cleanup: Box<dyn Cleanup>,
}

impl Lifecycle {
    /// The no-op pair returned for nil handles.
    pub fn null() -> Self {
        Self {
            setup: Box::new(NullLifecycle),
            cleanup: Box::new(NullLifecycle),
        }
    }

    pub(crate) fn composed(setups: Setups, cleanups: Cleanups) -> Self {
        Self {
            setup: Box::new(setups),
            cleanup: Box::new(cleanups),
        }
    }
}
