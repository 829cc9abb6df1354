//! Host-side world access
//!
//! The engine never owns entities. Everything it knows about one comes
//! through these narrow accessors, and any of them may start reporting an
//! entity as deleted between enumeration and use.

use std::fmt::Debug;
use std::hash::Hash;

use crate::matching::FormKind;

/// One inventory stack as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    /// Display name; `None` or empty when the item can't be resolved
    pub name: Option<String>,
    pub count: i32,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, count: i32) -> Self {
        Self {
            name: Some(name.into()),
            count,
        }
    }

    /// Positive count and a non-empty display name
    pub fn is_visible(&self) -> bool {
        self.count > 0 && self.name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// The host world, as seen by the scanner
pub trait World {
    /// Opaque handle, used only as a map/set key
    type Entity: Copy + Eq + Hash + Debug;

    /// False while paused, in a blocking menu, or loading
    fn is_simulation_advancing(&self) -> bool;

    /// Entity at the center of the search (usually the player)
    fn reference_entity(&self) -> Option<Self::Entity>;

    /// Entities within `radius` of `origin`. May include `origin` itself.
    fn nearby(&self, origin: Self::Entity, radius: f32) -> impl Iterator<Item = Self::Entity>;

    fn is_deleted(&self, entity: Self::Entity) -> bool;

    fn classification(&self, entity: Self::Entity) -> Option<FormKind>;

    fn is_dead(&self, entity: Self::Entity) -> bool;

    fn inventory(&self, entity: Self::Entity) -> Vec<InventoryItem>;

    /// Classification of the entity's base template, if it has one
    fn base_kind(&self, entity: Self::Entity) -> Option<FormKind>;
}
