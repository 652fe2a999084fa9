use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use packbuilder_core::{Aggregate, AggregateRoot, ProductId, SelectionId};
use packbuilder_events::Event;

/// Maximum number of units one pack may hold, across all products.
pub const QUOTA_MAX: usize = 3;

/// Selection failures. All are defensive guards: the storefront is expected
/// to have pre-disabled the control, so every rejection degrades to a no-op
/// rather than a user-visible fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// Add attempted with no remaining quota.
    #[error("quota exceeded: pack already holds {quota} units")]
    QuotaExceeded { quota: usize },

    /// Remove attempted for a product with no selected units.
    #[error("nothing to remove: no units of product {product_id} selected")]
    NothingToRemove { product_id: ProductId },

    /// Command addressed to a different selection.
    #[error("selection_id mismatch")]
    SelectionMismatch,
}

/// Aggregate root: the ordered multiset of chosen product units.
///
/// Entries are product ids; duplicates are multiple units of the same
/// product. Insertion order is preserved because the cart renders units in
/// positional slots 0..3 reflecting insertion sequence, not product order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    id: SelectionId,
    units: Vec<ProductId>,
    version: u64,
}

impl Selection {
    /// A fresh, empty selection. Sessions start here; there is no creation
    /// command because an empty selection is the initial state, not an event.
    pub fn new(id: SelectionId) -> Self {
        Self {
            id,
            units: Vec::with_capacity(QUOTA_MAX),
            version: 0,
        }
    }

    pub fn id_typed(&self) -> SelectionId {
        self.id
    }

    /// The chosen units, in insertion order.
    pub fn units(&self) -> &[ProductId] {
        &self.units
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Remaining global quota. Always `QUOTA_MAX - unit_count()`; never
    /// stored, so it cannot drift from the unit sequence.
    pub fn remaining_quota(&self) -> usize {
        QUOTA_MAX - self.units.len()
    }

    /// Number of units of `product_id` currently selected.
    pub fn count_for(&self, product_id: &ProductId) -> usize {
        self.units.iter().filter(|unit| *unit == product_id).count()
    }

    /// Whether one more unit of this product could be added.
    ///
    /// The global quota gates every product equally — there is no per-product
    /// sub-limit, so a single product may occupy all three slots.
    pub fn can_increment(&self, _product_id: &ProductId) -> bool {
        self.remaining_quota() > 0
    }

    /// Whether one unit of this product could be removed.
    pub fn can_decrement(&self, product_id: &ProductId) -> bool {
        self.count_for(product_id) > 0
    }

    /// The unit occupying cart slot `slot` (0..QUOTA_MAX), if any.
    pub fn slot(&self, slot: usize) -> Option<&ProductId> {
        self.units.get(slot)
    }

    /// All cart slots in positional order; trailing slots are empty until
    /// insertion fills them.
    pub fn slots(&self) -> [Option<&ProductId>; QUOTA_MAX] {
        core::array::from_fn(|slot| self.units.get(slot))
    }

    /// Whether the pack is full (remaining quota is zero).
    pub fn is_complete(&self) -> bool {
        self.units.len() == QUOTA_MAX
    }
}

impl AggregateRoot for Selection {
    type Id = SelectionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddUnit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUnit {
    pub selection_id: SelectionId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveUnit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveUnit {
    pub selection_id: SelectionId,
    pub product_id: ProductId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionCommand {
    AddUnit(AddUnit),
    RemoveUnit(RemoveUnit),
}

/// Event: UnitAdded. `slot` is the position the unit landed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAdded {
    pub selection_id: SelectionId,
    pub product_id: ProductId,
    pub slot: usize,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UnitRemoved. `slot` is the position the unit was removed from —
/// always the first occurrence in insertion order, so the same cart slot
/// empties on replay as emptied live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRemoved {
    pub selection_id: SelectionId,
    pub product_id: ProductId,
    pub slot: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionEvent {
    UnitAdded(UnitAdded),
    UnitRemoved(UnitRemoved),
}

impl Event for SelectionEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SelectionEvent::UnitAdded(_) => "selection.unit_added",
            SelectionEvent::UnitRemoved(_) => "selection.unit_removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SelectionEvent::UnitAdded(e) => e.occurred_at,
            SelectionEvent::UnitRemoved(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Selection {
    type Command = SelectionCommand;
    type Event = SelectionEvent;
    type Error = SelectionError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SelectionEvent::UnitAdded(e) => {
                self.units.push(e.product_id.clone());
            }
            SelectionEvent::UnitRemoved(e) => {
                // Stable removal: drop the first occurrence, matching the
                // slot the handler decided on.
                if let Some(position) = self.units.iter().position(|unit| unit == &e.product_id) {
                    self.units.remove(position);
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SelectionCommand::AddUnit(cmd) => self.handle_add(cmd),
            SelectionCommand::RemoveUnit(cmd) => self.handle_remove(cmd),
        }
    }
}

impl Selection {
    fn ensure_selection_id(&self, selection_id: SelectionId) -> Result<(), SelectionError> {
        if self.id != selection_id {
            return Err(SelectionError::SelectionMismatch);
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddUnit) -> Result<Vec<SelectionEvent>, SelectionError> {
        self.ensure_selection_id(cmd.selection_id)?;

        if self.units.len() >= QUOTA_MAX {
            return Err(SelectionError::QuotaExceeded { quota: QUOTA_MAX });
        }

        Ok(vec![SelectionEvent::UnitAdded(UnitAdded {
            selection_id: cmd.selection_id,
            product_id: cmd.product_id.clone(),
            slot: self.units.len(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveUnit) -> Result<Vec<SelectionEvent>, SelectionError> {
        self.ensure_selection_id(cmd.selection_id)?;

        let Some(slot) = self.units.iter().position(|unit| unit == &cmd.product_id) else {
            return Err(SelectionError::NothingToRemove {
                product_id: cmd.product_id.clone(),
            });
        };

        Ok(vec![SelectionEvent::UnitRemoved(UnitRemoved {
            selection_id: cmd.selection_id,
            product_id: cmd.product_id.clone(),
            slot,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_selection() -> Selection {
        Selection::new(SelectionId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn add_cmd(selection: &Selection, product: &str) -> SelectionCommand {
        SelectionCommand::AddUnit(AddUnit {
            selection_id: selection.id_typed(),
            product_id: ProductId::new(product),
            occurred_at: test_time(),
        })
    }

    fn remove_cmd(selection: &Selection, product: &str) -> SelectionCommand {
        SelectionCommand::RemoveUnit(RemoveUnit {
            selection_id: selection.id_typed(),
            product_id: ProductId::new(product),
            occurred_at: test_time(),
        })
    }

    fn dispatch(selection: &mut Selection, cmd: SelectionCommand) -> Result<(), SelectionError> {
        let events = selection.handle(&cmd)?;
        for event in &events {
            selection.apply(event);
        }
        Ok(())
    }

    fn add_to(selection: &mut Selection, product: &str) -> Result<(), SelectionError> {
        let cmd = add_cmd(selection, product);
        dispatch(selection, cmd)
    }

    fn remove_from(selection: &mut Selection, product: &str) -> Result<(), SelectionError> {
        let cmd = remove_cmd(selection, product);
        dispatch(selection, cmd)
    }

    fn unit_ids(selection: &Selection) -> Vec<&str> {
        selection.units().iter().map(ProductId::as_str).collect()
    }

    #[test]
    fn new_selection_starts_empty_with_full_quota() {
        let selection = test_selection();
        assert!(selection.is_empty());
        assert_eq!(selection.remaining_quota(), QUOTA_MAX);
        assert_eq!(selection.version(), 0);
        assert!(!selection.is_complete());
        assert_eq!(selection.slots(), [None, None, None]);
    }

    #[test]
    fn add_unit_appends_in_insertion_order() {
        let mut selection = test_selection();
        add_to(&mut selection, "p1").unwrap();
        add_to(&mut selection, "p2").unwrap();

        assert_eq!(unit_ids(&selection), vec!["p1", "p2"]);
        assert_eq!(selection.remaining_quota(), 1);
        assert_eq!(selection.version(), 2);
    }

    #[test]
    fn add_unit_event_records_the_slot_it_fills() {
        let mut selection = test_selection();
        add_to(&mut selection, "p1").unwrap();

        let events = selection.handle(&add_cmd(&selection, "p2")).unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            SelectionEvent::UnitAdded(e) => {
                assert_eq!(e.slot, 1);
                assert_eq!(e.product_id, ProductId::new("p2"));
            }
            _ => panic!("Expected UnitAdded event"),
        }
    }

    #[test]
    fn add_unit_rejects_when_quota_exhausted() {
        let mut selection = test_selection();
        for product in ["p1", "p2", "p3"] {
            add_to(&mut selection, product).unwrap();
        }
        assert!(selection.is_complete());

        let err = selection.handle(&add_cmd(&selection, "p4")).unwrap_err();
        assert_eq!(err, SelectionError::QuotaExceeded { quota: QUOTA_MAX });
        assert_eq!(unit_ids(&selection), vec!["p1", "p2", "p3"]);
    }

    #[test]
    fn rejected_add_is_idempotent() {
        let mut selection = test_selection();
        for _ in 0..QUOTA_MAX {
            add_to(&mut selection, "p1").unwrap();
        }

        let before = selection.clone();
        for _ in 0..3 {
            let err = add_to(&mut selection, "p2").unwrap_err();
            assert_eq!(err, SelectionError::QuotaExceeded { quota: QUOTA_MAX });
            assert_eq!(selection, before);
        }
    }

    #[test]
    fn remove_unit_removes_first_matching_occurrence() {
        let mut selection = test_selection();
        for product in ["pA", "pB", "pA"] {
            add_to(&mut selection, product).unwrap();
        }

        remove_from(&mut selection, "pA").unwrap();

        // [A, B, A] minus the first A is [B, A], never [B].
        assert_eq!(unit_ids(&selection), vec!["pB", "pA"]);
        assert_eq!(selection.count_for(&ProductId::new("pA")), 1);
    }

    #[test]
    fn remove_unit_event_records_the_slot_that_empties() {
        let mut selection = test_selection();
        for product in ["pA", "pB", "pA"] {
            add_to(&mut selection, product).unwrap();
        }

        let events = selection.handle(&remove_cmd(&selection, "pB")).unwrap();
        match &events[0] {
            SelectionEvent::UnitRemoved(e) => assert_eq!(e.slot, 1),
            _ => panic!("Expected UnitRemoved event"),
        }
    }

    #[test]
    fn remove_unit_rejects_product_with_no_units() {
        let mut selection = test_selection();
        add_to(&mut selection, "p1").unwrap();

        let err = selection.handle(&remove_cmd(&selection, "p2")).unwrap_err();
        assert_eq!(
            err,
            SelectionError::NothingToRemove {
                product_id: ProductId::new("p2")
            }
        );
        assert_eq!(unit_ids(&selection), vec!["p1"]);
    }

    #[test]
    fn remove_on_empty_selection_is_a_no_op_signal() {
        let mut selection = test_selection();
        let err = remove_from(&mut selection, "p3").unwrap_err();

        assert!(matches!(err, SelectionError::NothingToRemove { .. }));
        assert!(selection.is_empty());
        assert_eq!(selection.version(), 0);
    }

    #[test]
    fn add_then_remove_restores_the_prior_exact_sequence() {
        let mut selection = test_selection();
        add_to(&mut selection, "p1").unwrap();
        add_to(&mut selection, "p2").unwrap();
        let before: Vec<String> = unit_ids(&selection).into_iter().map(String::from).collect();

        add_to(&mut selection, "p9").unwrap();
        remove_from(&mut selection, "p9").unwrap();

        assert_eq!(unit_ids(&selection), before);
    }

    #[test]
    fn full_pack_gates_every_product_equally() {
        // Add p1, p2, p1: quota is exhausted for p2 as well, even though p2
        // holds a single unit.
        let mut selection = test_selection();
        for product in ["p1", "p2", "p1"] {
            add_to(&mut selection, product).unwrap();
        }

        assert_eq!(unit_ids(&selection), vec!["p1", "p2", "p1"]);
        assert_eq!(selection.remaining_quota(), 0);
        assert_eq!(selection.count_for(&ProductId::new("p1")), 2);
        assert!(!selection.can_increment(&ProductId::new("p2")));
        assert!(!selection.can_increment(&ProductId::new("p1")));
    }

    #[test]
    fn removing_frees_capacity_for_any_product() {
        let mut selection = test_selection();
        for product in ["p1", "p2", "p1"] {
            add_to(&mut selection, product).unwrap();
        }

        remove_from(&mut selection, "p2").unwrap();

        assert_eq!(unit_ids(&selection), vec!["p1", "p1"]);
        assert_eq!(selection.remaining_quota(), 1);
        assert!(selection.can_increment(&ProductId::new("p1")));
        assert!(!selection.can_decrement(&ProductId::new("p2")));
    }

    #[test]
    fn a_single_product_may_occupy_all_slots() {
        let mut selection = test_selection();
        for _ in 0..QUOTA_MAX {
            add_to(&mut selection, "p1").unwrap();
        }

        assert_eq!(selection.count_for(&ProductId::new("p1")), QUOTA_MAX);
        assert!(selection.is_complete());
    }

    #[test]
    fn slots_reflect_insertion_order() {
        let mut selection = test_selection();
        add_to(&mut selection, "p2").unwrap();
        add_to(&mut selection, "p1").unwrap();

        let slots = selection.slots();
        assert_eq!(slots[0], Some(&ProductId::new("p2")));
        assert_eq!(slots[1], Some(&ProductId::new("p1")));
        assert_eq!(slots[2], None);
        assert_eq!(selection.slot(2), None);
    }

    #[test]
    fn commands_for_another_selection_are_rejected() {
        let mut selection = test_selection();
        let stranger = test_selection();

        let err = dispatch(&mut selection, add_cmd(&stranger, "p1")).unwrap_err();
        assert_eq!(err, SelectionError::SelectionMismatch);
        assert!(selection.is_empty());

        let err = dispatch(&mut selection, remove_cmd(&stranger, "p1")).unwrap_err();
        assert_eq!(err, SelectionError::SelectionMismatch);
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut selection = test_selection();
        add_to(&mut selection, "p1").unwrap();
        let before = selection.clone();

        let events1 = selection.handle(&add_cmd(&selection, "p2")).unwrap();
        let events2 = selection.handle(&add_cmd(&selection, "p2")).unwrap();

        assert_eq!(selection, before);
        assert_eq!(events1, events2);
    }

    #[test]
    fn version_increments_once_per_applied_event() {
        let mut selection = test_selection();
        assert_eq!(selection.version(), 0);

        add_to(&mut selection, "p1").unwrap();
        assert_eq!(selection.version(), 1);

        remove_from(&mut selection, "p1").unwrap();
        assert_eq!(selection.version(), 2);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        const PRODUCTS: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: for every Add/Remove sequence the quota invariant
            /// holds after each operation, and `remaining + len == QUOTA_MAX`.
            #[test]
            fn quota_invariant_holds_under_any_operation_sequence(
                ops in prop::collection::vec((any::<bool>(), 0usize..PRODUCTS.len()), 0..48)
            ) {
                let mut selection = Selection::new(SelectionId::new());
                let mut model: Vec<&str> = Vec::new();

                for (is_add, product_index) in ops {
                    let product = PRODUCTS[product_index];
                    let product_id = ProductId::new(product);
                    let cmd = if is_add {
                        SelectionCommand::AddUnit(AddUnit {
                            selection_id: selection.id_typed(),
                            product_id: product_id.clone(),
                            occurred_at: Utc::now(),
                        })
                    } else {
                        SelectionCommand::RemoveUnit(RemoveUnit {
                            selection_id: selection.id_typed(),
                            product_id: product_id.clone(),
                            occurred_at: Utc::now(),
                        })
                    };

                    let state_before = selection.clone();
                    match selection.handle(&cmd) {
                        Ok(events) => {
                            for event in &events {
                                selection.apply(event);
                            }
                            if is_add {
                                prop_assert!(model.len() < QUOTA_MAX);
                                model.push(product);
                            } else {
                                let position = model.iter().position(|p| *p == product);
                                prop_assert!(position.is_some());
                                model.remove(position.unwrap());
                            }
                        }
                        Err(err) => {
                            // Rejections are exact no-ops.
                            prop_assert_eq!(&selection, &state_before);
                            if is_add {
                                prop_assert_eq!(err, SelectionError::QuotaExceeded { quota: QUOTA_MAX });
                                prop_assert_eq!(model.len(), QUOTA_MAX);
                            } else {
                                prop_assert_eq!(
                                    err,
                                    SelectionError::NothingToRemove { product_id: product_id.clone() }
                                );
                                prop_assert!(!model.contains(&product));
                            }
                        }
                    }

                    // Engine state tracks the reference model exactly.
                    let units: Vec<&str> =
                        selection.units().iter().map(ProductId::as_str).collect();
                    prop_assert_eq!(&units, &model);
                    prop_assert!(selection.unit_count() <= QUOTA_MAX);
                    prop_assert_eq!(
                        selection.remaining_quota() + selection.unit_count(),
                        QUOTA_MAX
                    );
                }
            }

            /// Property: per-product counts partition the unit sequence.
            #[test]
            fn per_product_counts_sum_to_unit_count(
                picks in prop::collection::vec(0usize..PRODUCTS.len(), 0..QUOTA_MAX + 1)
            ) {
                let mut selection = Selection::new(SelectionId::new());
                for product_index in picks.iter().take(QUOTA_MAX) {
                    let cmd = SelectionCommand::AddUnit(AddUnit {
                        selection_id: selection.id_typed(),
                        product_id: ProductId::new(PRODUCTS[*product_index]),
                        occurred_at: Utc::now(),
                    });
                    for event in selection.handle(&cmd).unwrap() {
                        selection.apply(&event);
                    }
                }

                let total: usize = PRODUCTS
                    .iter()
                    .map(|p| selection.count_for(&ProductId::new(*p)))
                    .sum();
                prop_assert_eq!(total, selection.unit_count());

                for product in PRODUCTS {
                    let product_id = ProductId::new(product);
                    prop_assert_eq!(
                        selection.can_decrement(&product_id),
                        selection.count_for(&product_id) > 0
                    );
                    prop_assert_eq!(
                        selection.can_increment(&product_id),
                        selection.remaining_quota() > 0
                    );
                }
            }

            /// Property: apply is deterministic — replaying the same events
            /// reproduces the same state.
            #[test]
            fn replaying_events_reproduces_state(
                picks in prop::collection::vec(0usize..PRODUCTS.len(), 0..QUOTA_MAX)
            ) {
                let id = SelectionId::new();
                let mut live = Selection::new(id);
                let mut committed = Vec::new();

                for product_index in picks {
                    let cmd = SelectionCommand::AddUnit(AddUnit {
                        selection_id: id,
                        product_id: ProductId::new(PRODUCTS[product_index]),
                        occurred_at: Utc::now(),
                    });
                    for event in live.handle(&cmd).unwrap() {
                        live.apply(&event);
                        committed.push(event);
                    }
                }

                let mut replayed = Selection::new(id);
                for event in &committed {
                    replayed.apply(event);
                }

                prop_assert_eq!(live, replayed);
            }
        }
    }
}
