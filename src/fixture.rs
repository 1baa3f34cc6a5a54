//! The `Fixture` trait and the shared handle type fixtures are held by.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::ContextHandle;
use crate::lifecycle::{Cleanup, Setup};
use crate::walker::Fields;

/// Shared, mutable handle to a fixture. `Option<Shared<T>>` is a nil-able
/// fixture field; two fields holding clones of one handle are aliases.
pub type Shared<T> = Rc<RefCell<T>>;

/// Wrap a value in a fresh [`Shared`] handle.
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Receives the ambient test context during a build.
pub trait AcceptsContext {
    fn set_context(&mut self, context: ContextHandle);
}

/// A value the builder can walk.
///
/// `visit` enumerates the directly declared fields that may hold fixtures, in
/// declaration order. The `as_*` queries expose optional capabilities and
/// default to `None`; override the ones the type implements.
///
/// ```rust
/// use fixture_graph::{Fields, Fixture, Setup, Shared};
///
/// #[derive(Default)]
/// struct DatabaseFixture {
///     ready: bool,
/// }
///
/// impl Setup for DatabaseFixture {
///     fn setup(&mut self) {
///         self.ready = true;
///     }
/// }
///
/// impl Fixture for DatabaseFixture {
///     fn as_setup(&mut self) -> Option<&mut dyn Setup> {
///         Some(self)
///     }
/// }
///
/// #[derive(Default)]
/// struct RepositoryFixture {
///     database: Option<Shared<DatabaseFixture>>,
/// }
///
/// impl Fixture for RepositoryFixture {
///     fn visit(fields: &mut Fields<'_, '_, Self>) {
///         fields.handle("database", |f| &mut f.database);
///     }
/// }
/// ```
pub trait Fixture: 'static {
    fn visit(fields: &mut Fields<'_, '_, Self>)
    where
        Self: Sized,
    {
        let _ = fields;
    }

    fn as_setup(&mut self) -> Option<&mut dyn Setup> {
        None
    }

    fn as_cleanup(&mut self) -> Option<&mut dyn Cleanup> {
        None
    }

    fn as_context_aware(&mut self) -> Option<&mut dyn AcceptsContext> {
        None
    }
}
