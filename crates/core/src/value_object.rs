//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two with the
/// same attribute values are the same value. To "modify" one, construct a new
/// one. `Price` and `IconKey` in the catalog crate are the canonical examples
/// here; `Product` is not (it is an entity identified by its `ProductId`).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
