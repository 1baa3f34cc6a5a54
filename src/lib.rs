//! Fixture graph assembly for tests.
//!
//! A test declares what it needs as a root fixture struct. [`build`] walks
//! that struct and, for every field classified as a fixture:
//!
//! - allocates nil handle fields with a default instance,
//! - points every later field of an already allocated type at that same
//!   instance, so a dependency shared by several fixtures exists once,
//! - hands the test context to fixtures implementing [`AcceptsContext`],
//! - collects [`Setup`] and [`Cleanup`] hooks depth-first.
//!
//! The aggregate setup is returned to the test, which may do more
//! preparation before invoking it. The aggregate cleanup is registered with
//! the test context and runs at teardown.
//!
//! By default a fixture type is any type whose name ends in `Fixture`; see
//! [`FixtureBuilder::with_include`] and [`BuildConfig`] to change that.
//!
//! Setup and context injection should be idempotent: when a fixture embeds
//! another fixture by value and both expose setup, both are invoked.
//!
//! ```rust
//! use fixture_graph::{build, shared, Fields, Fixture, Setup, Shared, TestScope};
//!
//! #[derive(Default)]
//! struct ServerFixture {
//!     url: Option<String>,
//! }
//!
//! impl Setup for ServerFixture {
//!     fn setup(&mut self) {
//!         self.url.get_or_insert_with(|| "http://127.0.0.1:8080".to_string());
//!     }
//! }
//!
//! impl Fixture for ServerFixture {
//!     fn as_setup(&mut self) -> Option<&mut dyn Setup> {
//!         Some(self)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct ClientFixture {
//!     server: Option<Shared<ServerFixture>>,
//! }
//!
//! impl Fixture for ClientFixture {
//!     fn visit(fields: &mut Fields<'_, '_, Self>) {
//!         fields.handle("server", |f| &mut f.server);
//!     }
//! }
//!
//! #[derive(Default)]
//! struct TestRoot {
//!     server: Option<Shared<ServerFixture>>,
//!     client: Option<Shared<ClientFixture>>,
//! }
//!
//! impl Fixture for TestRoot {
//!     fn visit(fields: &mut Fields<'_, '_, Self>) {
//!         fields.handle("server", |f| &mut f.server);
//!         fields.handle("client", |f| &mut f.client);
//!     }
//! }
//!
//! let scope = TestScope::new("client_talks_to_server");
//! let (fixture, mut setup) = build(&scope.handle(), shared(TestRoot::default()));
//! setup.setup();
//!
//! let fixture = fixture.borrow();
//! let server = fixture.server.as_ref().unwrap();
//! let client_server = fixture.client.as_ref().unwrap().borrow().server.clone().unwrap();
//! assert!(std::rc::Rc::ptr_eq(server, &client_server));
//! ```

use std::rc::Rc;

pub mod builder;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod fixture;
pub mod lifecycle;
pub mod logging;
mod registry;
pub mod walker;

pub use builder::{Built, FixtureBuilder, Root};
pub use classify::{Classifier, FieldInfo, FieldKind, DEFAULT_DESIGNATOR};
pub use config::BuildConfig;
pub use context::{ContextHandle, RecordingContext, TestContext, TestScope};
pub use error::{BuildError, ErrorCode};
pub use fixture::{shared, AcceptsContext, Fixture, Shared};
pub use lifecycle::{Cleanup, Cleanups, Lifecycle, NullLifecycle, Setup, Setups};
pub use logging::init_test_logging;
pub use walker::Fields;

/// Build `root` with the default policy.
///
/// Populates nil fixture fields, registers the aggregate cleanup with
/// `context` and returns the root with the aggregate setup. A root that is
/// not a [`Shared`] handle is reported through [`TestContext::fatal`].
pub fn build<R: Root>(context: &ContextHandle, root: R) -> (R, Setups) {
    FixtureBuilder::new(Rc::clone(context)).build(root)
}
