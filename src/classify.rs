//! Field descriptions and the "is this a fixture" policy.

use std::any::TypeId;

/// Designator used by the default classification policy.
pub const DEFAULT_DESIGNATOR: &str = "Fixture";

/// How a field holds its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `Option<Shared<T>>`: may be nil, may be allocated or aliased.
    Handle { is_nil: bool },
    /// A `T` stored in place, reached through its owner's handle.
    Embedded,
    /// A `T` that is walked through a clone; mutations do not reach the field.
    Copied,
}

/// What a classifier sees about one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub owner: &'static str,
    pub name: &'static str,
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub kind: FieldKind,
}

impl FieldInfo {
    /// The field type's name without module path or generic arguments
    /// (`my_app::tests::ServerFixture<u8>` becomes `ServerFixture`).
    pub fn short_type_name(&self) -> &'static str {
        short_type_name(self.type_name)
    }
}

/// Caller-supplied classification predicate.
pub type Classifier = Box<dyn Fn(&FieldInfo) -> bool>;

pub fn short_type_name(type_name: &'static str) -> &'static str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// Default policy: the field type's short name ends with `designator`.
///
/// Generic instantiations never match: the full name of `ServerFixture<u8>`
/// ends in its type arguments, not in `Fixture`. Use a custom classifier to
/// manage generic fixtures.
pub fn has_designator(info: &FieldInfo, designator: &str) -> bool {
    !info.type_name.ends_with('>') && info.short_type_name().ends_with(designator)
}
