//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// with the same attribute values are the same value. A `PriceQuote` or a
/// `Resolution` tier is a value object; an `UpscaleJob` (which keeps its
/// identity as it moves through processing) is an entity.
///
/// To "modify" a value object, construct a new one. Immutability keeps value
/// objects safe to share across request-handling threads without locking.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
