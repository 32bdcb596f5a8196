//! Entity trait: identity + continuity across state changes.
//!
//! Entities are compared by identity, never by attribute values: two aggregates with
//! identical fields but different identifiers are different entities, and an aggregate
//! keeps its identity across every update.

use uuid::Uuid;

use crate::id::AggregateId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Capability: "this value exposes an identifier".
///
/// Equality between entities is a capability check rather than a nominal one: any two
/// values that expose the same identifier are the same entity.
pub trait Identified {
    /// The identifier, or `None` while the value is transient.
    fn identifier(&self) -> Option<Uuid>;

    /// True only when both sides expose an identifier and the identifiers match.
    ///
    /// A transient value is never the same entity as anything, itself included.
    fn same_identity(&self, other: &dyn Identified) -> bool {
        match (self.identifier(), other.identifier()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Identity primitive embedded in aggregates.
///
/// `PartialEq` follows [`Identified::same_identity`]; there is deliberately no `Eq`
/// impl because a transient identity is not equal to itself.
#[derive(Debug, Copy, Clone)]
pub struct Identity {
    id: Option<AggregateId>,
}

impl Identity {
    pub fn new(id: Option<AggregateId>) -> Self {
        Self { id }
    }

    /// Identity for a value that has been assigned its identifier.
    pub fn assigned(id: AggregateId) -> Self {
        Self { id: Some(id) }
    }

    /// Identity for a value constructed without an identifier.
    pub fn transient() -> Self {
        Self { id: None }
    }

    pub fn id(&self) -> Option<AggregateId> {
        self.id
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}

impl Identified for Identity {
    fn identifier(&self) -> Option<Uuid> {
        self.id.map(Uuid::from)
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl core::hash::Hash for Identity {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    struct Tagged {
        id: Uuid,
    }

    impl Identified for Tagged {
        fn identifier(&self) -> Option<Uuid> {
            Some(self.id)
        }
    }

    #[test]
    fn same_identifier_means_same_identity() {
        let id = AggregateId::new();
        let a = Identity::assigned(id);
        let b = Identity::new(Some(id));
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_identifiers_are_different_identities() {
        assert_ne!(
            Identity::assigned(AggregateId::new()),
            Identity::assigned(AggregateId::new())
        );
    }

    #[test]
    fn transient_identity_equals_nothing() {
        let transient = Identity::transient();
        assert!(transient.is_transient());
        assert_ne!(transient, Identity::transient());
        assert_ne!(transient, Identity::assigned(AggregateId::new()));
        assert!(!transient.same_identity(&transient));
    }

    #[test]
    fn identity_is_compared_across_identified_types() {
        let uuid = Uuid::now_v7();
        let identity = Identity::assigned(AggregateId::from_uuid(uuid));
        let other = Tagged { id: uuid };
        assert!(identity.same_identity(&other));
        assert!(other.same_identity(&identity));
        assert!(!Identity::transient().same_identity(&other));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Equality and hashing only ever look at the identifier.
            #[test]
            fn equal_identities_hash_equally(raw in any::<u128>()) {
                let id = AggregateId::from_uuid(Uuid::from_u128(raw));
                let a = Identity::assigned(id);
                let b = Identity::assigned(id);
                prop_assert!(a == b);
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }
    }
}
