//! Graph walker: visits fixture fields, allocates or aliases handles, and
//! composes each node's lifecycle bottom-up.
//!
//! A node's children are visited in the order its [`Fixture::visit`]
//! registers them. The node's own setup/cleanup is appended after all of its
//! children's, so by the time a fixture's setup runs every fixture it holds
//! has been set up.

use std::any::{type_name, TypeId};
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::classify::{has_designator, FieldInfo, FieldKind};
use crate::config::BuildConfig;
use crate::context::{ContextHandle, TestContext};
use crate::fixture::{shared, Fixture, Shared};
use crate::lifecycle::{Cleanup, Cleanups, Lifecycle, Setup, Setups};
use crate::registry::DependencyRegistry;

/// Deferred mutable access to a node.
///
/// Handles borrow their `RefCell` on each call. Embedded nodes go through
/// their owner's access plus a field projection, which is what lets hooks on
/// by-value fields mutate the real field later on.
pub(crate) struct NodeAccess<T> {
    with: Rc<dyn Fn(&mut dyn FnMut(&mut T))>,
}

impl<T> Clone for NodeAccess<T> {
    fn clone(&self) -> Self {
        Self {
            with: Rc::clone(&self.with),
        }
    }
}

impl<T: 'static> NodeAccess<T> {
    /// A busy borrow at hook time means the hook cannot run; that is reported
    /// as fatal to the build's context. The context is held weakly since it
    /// owns the registered cleanup, which owns this access.
    fn shared(handle: Shared<T>, context: &ContextHandle) -> Self {
        let context: Weak<dyn TestContext> = Rc::downgrade(context);
        Self {
            with: Rc::new(move |f: &mut dyn FnMut(&mut T)| match handle.try_borrow_mut() {
                Ok(mut node) => f(&mut *node),
                Err(_) => {
                    warn!(node = type_name::<T>(), "fixture already borrowed; hook skipped");
                    if let Some(context) = context.upgrade() {
                        context.fatal(&format!(
                            "fixture {} is borrowed while its setup or cleanup runs; \
                             release borrows of fixtures before invoking hooks",
                            type_name::<T>()
                        ));
                    }
                }
            }),
        }
    }

    fn project<C: 'static>(&self, project: Rc<dyn Fn(&mut T) -> &mut C>) -> NodeAccess<C> {
        let parent = Rc::clone(&self.with);
        NodeAccess {
            with: Rc::new(move |f: &mut dyn FnMut(&mut C)| {
                parent(&mut |node: &mut T| f(project(node)));
            }),
        }
    }

    fn with(&self, f: &mut dyn FnMut(&mut T)) {
        (self.with)(f)
    }
}

struct NodeSetup<T> {
    access: NodeAccess<T>,
}

impl<T: Fixture> Setup for NodeSetup<T> {
    fn setup(&mut self) {
        self.access.with(&mut |node: &mut T| {
            if let Some(setup) = node.as_setup() {
                setup.setup();
            }
        });
    }
}

struct NodeCleanup<T> {
    access: NodeAccess<T>,
}

impl<T: Fixture> Cleanup for NodeCleanup<T> {
    fn cleanup(&mut self) {
        self.access.with(&mut |node: &mut T| {
            if let Some(cleanup) = node.as_cleanup() {
                cleanup.cleanup();
            }
        });
    }
}

/// State of one build: the context to inject, the classification policy and
/// the registry of instances created so far.
pub(crate) struct Walker<'b> {
    context: ContextHandle,
    include: Option<&'b dyn Fn(&FieldInfo) -> bool>,
    config: &'b BuildConfig,
    registry: DependencyRegistry,
}

impl<'b> Walker<'b> {
    pub(crate) fn new(
        context: ContextHandle,
        include: Option<&'b dyn Fn(&FieldInfo) -> bool>,
        config: &'b BuildConfig,
    ) -> Self {
        Self {
            context,
            include,
            config,
            registry: DependencyRegistry::new(),
        }
    }

    /// Type names of every instance this build allocated, in order.
    pub(crate) fn created(&self) -> Vec<&'static str> {
        self.registry.type_names()
    }

    fn includes(&self, info: &FieldInfo) -> bool {
        match self.include {
            Some(include) => include(info),
            None => has_designator(info, &self.config.designator),
        }
    }

    /// Walk the fixture behind `handle`. A nil handle is an inert subtree.
    pub(crate) fn walk_handle<T: Fixture>(&mut self, handle: Option<&Shared<T>>) -> Lifecycle {
        let Some(handle) = handle else {
            trace!(node = type_name::<T>(), "nil handle; inert subtree");
            return Lifecycle::null();
        };

        let access = NodeAccess::shared(Rc::clone(handle), &self.context);
        let mut node = match handle.try_borrow_mut() {
            Ok(node) => node,
            Err(_) => {
                warn!(
                    node = type_name::<T>(),
                    "fixture reached again while being walked; treating as nil"
                );
                return Lifecycle::null();
            }
        };
        self.walk_node(&mut *node, &access)
    }

    fn walk_node<T: Fixture>(&mut self, node: &mut T, access: &NodeAccess<T>) -> Lifecycle {
        let mut setups = Setups::new();
        let mut cleanups = Cleanups::new();

        {
            let mut fields = Fields {
                node: &mut *node,
                access,
                walker: &mut *self,
                setups: &mut setups,
                cleanups: &mut cleanups,
            };
            T::visit(&mut fields);
        }

        if let Some(aware) = node.as_context_aware() {
            aware.set_context(Rc::clone(&self.context));
        }
        if node.as_setup().is_some() {
            setups.push(Box::new(NodeSetup {
                access: access.clone(),
            }));
        }
        if node.as_cleanup().is_some() {
            cleanups.push(Box::new(NodeCleanup {
                access: access.clone(),
            }));
        }

        Lifecycle::composed(setups, cleanups)
    }
}

/// The fields of one node, as seen by [`Fixture::visit`].
///
/// Register only directly declared fields, in declaration order. Each
/// registered field is classified first; rejected fields are left untouched.
pub struct Fields<'a, 'w, P> {
    node: &'a mut P,
    access: &'a NodeAccess<P>,
    walker: &'a mut Walker<'w>,
    setups: &'a mut Setups,
    cleanups: &'a mut Cleanups,
}

impl<'a, 'w, P: Fixture> Fields<'a, 'w, P> {
    /// A nil-able handle field.
    ///
    /// If this build already allocated a `C`, the field is pointed at that
    /// instance (even when it held a handle of its own) and not walked again.
    /// Otherwise a nil field receives `C::default()`, recorded before the new
    /// instance is walked so that anything beneath it needing a `C` shares it.
    pub fn handle<C, F>(&mut self, name: &'static str, project: F)
    where
        C: Fixture + Default,
        F: FnOnce(&mut P) -> &mut Option<Shared<C>>,
    {
        let slot = project(&mut *self.node);
        let info = field_info::<P, C>(name, FieldKind::Handle {
            is_nil: slot.is_none(),
        });
        if !self.walker.includes(&info) {
            trace!(owner = info.owner, field = name, "unmanaged field skipped");
            return;
        }

        if let Some(existing) = self.walker.registry.lookup::<C>() {
            trace!(owner = info.owner, field = name, "aliased to shared instance");
            *slot = Some(existing);
            return;
        }

        let child = match slot.clone() {
            Some(child) => child,
            None if self.walker.config.allocate_missing => {
                let child = shared(C::default());
                *slot = Some(Rc::clone(&child));
                self.walker.registry.record(Rc::clone(&child));
                debug!(
                    owner = info.owner,
                    field = name,
                    fixture = info.type_name,
                    "allocated fixture"
                );
                child
            }
            None => {
                trace!(owner = info.owner, field = name, "allocation disabled; left nil");
                self.push(Lifecycle::null());
                return;
            }
        };

        let lifecycle = self.walker.walk_handle(Some(&child));
        self.push(lifecycle);
    }

    /// A fixture stored by value inside this node.
    ///
    /// It is walked in place, never allocated or shared. Its hooks reach it
    /// through this node's handle and `project`, so they mutate the real field.
    pub fn embedded<C, F>(&mut self, name: &'static str, project: F)
    where
        C: Fixture,
        F: Fn(&mut P) -> &mut C + 'static,
    {
        let info = field_info::<P, C>(name, FieldKind::Embedded);
        if !self.walker.includes(&info) {
            trace!(owner = info.owner, field = name, "unmanaged field skipped");
            return;
        }

        let project: Rc<dyn Fn(&mut P) -> &mut C> = Rc::new(project);
        let access = self.access.project(Rc::clone(&project));
        let child = project(&mut *self.node);
        let lifecycle = self.walker.walk_node(child, &access);
        self.push(lifecycle);
    }

    /// A fixture that can only be reached as a copy.
    ///
    /// The copy returned by `read` is what gets walked, context-injected, set
    /// up and cleaned up. None of that reaches the field itself; use this
    /// only for fixtures whose hooks act on shared state (handles they hold)
    /// rather than on their own fields.
    pub fn copied<C, F>(&mut self, name: &'static str, read: F)
    where
        C: Fixture,
        F: FnOnce(&P) -> C,
    {
        let info = field_info::<P, C>(name, FieldKind::Copied);
        if !self.walker.includes(&info) {
            trace!(owner = info.owner, field = name, "unmanaged field skipped");
            return;
        }

        debug!(
            owner = info.owner,
            field = name,
            "walking a copy; mutations will not reach the field"
        );
        let copy = shared(read(&*self.node));
        let lifecycle = self.walker.walk_handle(Some(&copy));
        self.push(lifecycle);
    }

    fn push(&mut self, lifecycle: Lifecycle) {
        self.setups.push(lifecycle.setup);
        self.cleanups.push(lifecycle.cleanup);
    }
}

fn field_info<P: 'static, C: 'static>(name: &'static str, kind: FieldKind) -> FieldInfo {
    FieldInfo {
        owner: type_name::<P>(),
        name,
        type_name: type_name::<C>(),
        type_id: TypeId::of::<C>(),
        kind,
    }
}
