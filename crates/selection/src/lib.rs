//! Selection engine: the quota-constrained pack selection domain.
//!
//! This crate is pure, deterministic domain logic (no IO, no catalog, no
//! rendering). The single source of truth is the ordered unit sequence held
//! by the [`Selection`] aggregate; remaining quota, per-product counts, and
//! every UI-facing affordance are derived from it on demand.

pub mod selection;

pub use selection::{
    AddUnit, RemoveUnit, Selection, SelectionCommand, SelectionError, SelectionEvent, UnitAdded,
    UnitRemoved, QUOTA_MAX,
};
