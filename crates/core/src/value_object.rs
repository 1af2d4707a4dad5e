//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**; they are defined entirely by their
//! attribute values (a price, a consumption quantity, a history record).

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by value. To "modify" one, build a
/// new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Price {
///     cents: u64,
/// }
///
/// impl ValueObject for Price {}
///
/// assert_eq!(Price { cents: 4550 }, Price { cents: 4550 });
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
