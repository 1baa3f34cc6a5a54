//! Build-scoped record of the fixture instances a build allocated.

use std::any::{Any, TypeId};

use crate::fixture::Shared;

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    instance: Box<dyn Any>,
}

/// Instances allocated during one build, keyed by exact type.
///
/// Owned by a single walker and dropped with it. Holds at most one entry per
/// type.
#[derive(Default)]
pub(crate) struct DependencyRegistry {
    entries: Vec<Entry>,
}

impl DependencyRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lookup<T: 'static>(&self) -> Option<Shared<T>> {
        let wanted = TypeId::of::<T>();
        self.entries
            .iter()
            .find(|entry| entry.type_id == wanted)
            .and_then(|entry| entry.instance.downcast_ref::<Shared<T>>())
            .cloned()
    }

    /// Record a freshly allocated instance. Returns `false` (and keeps the
    /// existing entry) if one of the same type is already present.
    pub(crate) fn record<T: 'static>(&mut self, instance: Shared<T>) -> bool {
        let type_id = TypeId::of::<T>();
        if self.entries.iter().any(|entry| entry.type_id == type_id) {
            return false;
        }
        self.entries.push(Entry {
            type_id,
            type_name: std::any::type_name::<T>(),
            instance: Box::new(instance),
        });
        true
    }

    /// Type names of recorded instances, in allocation order.
    pub(crate) fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.type_name).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
