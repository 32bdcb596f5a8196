//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have no identity; two value objects with the same attribute values
/// are interchangeable. Contrast with [`crate::Entity`], where only the identifier
/// matters.
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Margin(Decimal);
///
/// impl ValueObject for Margin {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
