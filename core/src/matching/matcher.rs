//! Entity/objective matching against the host world

use crate::tracking::Objective;
use crate::world::{InventoryItem, World};

use super::MatchCriteria;

/// Evaluates entities against objectives using the world's accessors.
///
/// Stateless apart from the borrowed world, so one matcher can be shared
/// across every objective of a scan pass.
pub struct ObjectiveMatcher<'w, W: World> {
    world: &'w W,
}

impl<'w, W: World> ObjectiveMatcher<'w, W> {
    pub fn new(world: &'w W) -> Self {
        Self { world }
    }

    /// True if `entity` satisfies every criteria of `objective`.
    ///
    /// Deleted entities never match.
    pub fn matches(&self, entity: W::Entity, objective: &Objective) -> bool {
        if self.world.is_deleted(entity) {
            return false;
        }

        // Inventory lookups can be costly on the host; fetch at most once
        let mut inventory: Option<Vec<InventoryItem>> = None;

        objective
            .criteria()
            .iter()
            .all(|criteria| self.matches_criteria(entity, criteria, &mut inventory))
    }

    fn matches_criteria(
        &self,
        entity: W::Entity,
        criteria: &MatchCriteria,
        inventory: &mut Option<Vec<InventoryItem>>,
    ) -> bool {
        if !criteria.form_kinds.is_empty()
            && !criteria.allows_kind(self.world.classification(entity).as_ref())
        {
            return false;
        }

        if criteria.non_empty_inventory {
            let items = inventory.get_or_insert_with(|| self.world.inventory(entity));
            if !items.iter().any(InventoryItem::is_visible) {
                return false;
            }
        }

        if criteria.is_dead && !self.world.is_dead(entity) {
            return false;
        }

        // Entities without a base template skip the base check
        if !criteria.base_form_kinds.is_empty() {
            if let Some(base) = self.world.base_kind(entity) {
                if !criteria.allows_base_kind(Some(&base)) {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use hashbrown::HashMap;

    use super::*;
    use crate::matching::FormKind;

    #[derive(Default, Clone)]
    struct Props {
        kind: Option<&'static str>,
        base: Option<&'static str>,
        dead: bool,
        deleted: bool,
        items: Vec<InventoryItem>,
    }

    #[derive(Default)]
    struct TestWorld {
        entities: HashMap<u32, Props>,
        inventory_calls: Cell<usize>,
    }

    impl TestWorld {
        fn with(mut self, id: u32, props: Props) -> Self {
            self.entities.insert(id, props);
            self
        }

        fn props(&self, id: u32) -> Props {
            self.entities.get(&id).cloned().unwrap_or_default()
        }
    }

    impl World for TestWorld {
        type Entity = u32;

        fn is_simulation_advancing(&self) -> bool {
            true
        }

        fn reference_entity(&self) -> Option<u32> {
            Some(0)
        }

        fn nearby(&self, _origin: u32, _radius: f32) -> impl Iterator<Item = u32> {
            self.entities.keys().copied().collect::<Vec<_>>().into_iter()
        }

        fn is_deleted(&self, entity: u32) -> bool {
            self.props(entity).deleted
        }

        fn classification(&self, entity: u32) -> Option<FormKind> {
            self.props(entity).kind.map(FormKind::new)
        }

        fn is_dead(&self, entity: u32) -> bool {
            self.props(entity).dead
        }

        fn inventory(&self, entity: u32) -> Vec<InventoryItem> {
            self.inventory_calls.set(self.inventory_calls.get() + 1);
            self.props(entity).items
        }

        fn base_kind(&self, entity: u32) -> Option<FormKind> {
            self.props(entity).base.map(FormKind::new)
        }
    }

    fn objective(criteria: Vec<MatchCriteria>) -> Objective {
        Objective::new("test.Objective1", "Test", criteria, 10)
    }

    fn chest(items: Vec<InventoryItem>) -> Props {
        Props {
            kind: Some("container"),
            base: Some("container"),
            items,
            ..Props::default()
        }
    }

    #[test]
    fn test_wildcard_matches_anything_not_deleted() {
        let world = TestWorld::default()
            .with(1, Props::default())
            .with(2, Props { deleted: true, ..Props::default() });
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![MatchCriteria::new()]);

        assert!(matcher.matches(1, &obj));
        assert!(!matcher.matches(2, &obj));
    }

    #[test]
    fn test_kind_filter() {
        let world = TestWorld::default()
            .with(1, chest(vec![]))
            .with(2, Props { kind: Some("npc"), ..Props::default() })
            .with(3, Props::default());
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![MatchCriteria::new().with_form_kinds(["Container"])]);

        assert!(matcher.matches(1, &obj));
        assert!(!matcher.matches(2, &obj));
        assert!(!matcher.matches(3, &obj), "unclassified entity must not match a kind filter");
    }

    #[test]
    fn test_inventory_requires_named_positive_stack() {
        let world = TestWorld::default()
            .with(1, chest(vec![InventoryItem::new("Gold", 10)]))
            .with(2, chest(vec![InventoryItem::new("Gold", 0)]))
            .with(3, chest(vec![InventoryItem::new("", 4)]))
            .with(4, chest(vec![InventoryItem { name: None, count: 4 }]))
            .with(5, chest(vec![]));
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![MatchCriteria::new().requiring_inventory()]);

        assert!(matcher.matches(1, &obj));
        for id in 2..=5 {
            assert!(!matcher.matches(id, &obj), "entity {id} should not match");
        }
    }

    #[test]
    fn test_dead_and_base_kind() {
        let world = TestWorld::default()
            .with(1, Props { kind: Some("npc"), base: Some("npc_"), dead: true, ..Props::default() })
            .with(2, Props { kind: Some("npc"), base: Some("npc_"), ..Props::default() })
            .with(3, Props { kind: Some("npc"), dead: true, ..Props::default() })
            .with(4, Props { kind: Some("npc"), base: Some("actor"), dead: true, ..Props::default() });
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![MatchCriteria::new()
            .requiring_dead()
            .with_base_form_kinds(["NPC_"])]);

        assert!(matcher.matches(1, &obj));
        assert!(!matcher.matches(2, &obj), "alive");
        assert!(matcher.matches(3, &obj), "no base template");
        assert!(!matcher.matches(4, &obj), "other base template");
    }

    #[test]
    fn test_all_criteria_must_match() {
        let world = TestWorld::default()
            .with(1, Props {
                kind: Some("npc"),
                dead: true,
                items: vec![InventoryItem::new("Iron Sword", 1)],
                ..Props::default()
            })
            .with(2, Props { kind: Some("npc"), dead: true, ..Props::default() });
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![
            MatchCriteria::new().with_form_kinds(["npc"]).requiring_dead(),
            MatchCriteria::new().requiring_inventory(),
        ]);

        assert!(matcher.matches(1, &obj));
        assert!(!matcher.matches(2, &obj));
    }

    #[test]
    fn test_inventory_fetched_once_per_match() {
        let world = TestWorld::default().with(1, chest(vec![InventoryItem::new("Gold", 1)]));
        let matcher = ObjectiveMatcher::new(&world);
        let obj = objective(vec![
            MatchCriteria::new().requiring_inventory(),
            MatchCriteria::new().requiring_inventory(),
        ]);

        assert!(matcher.matches(1, &obj));
        assert_eq!(world.inventory_calls.get(), 1);
    }
}
