//! User relations: favorites, shopping cart membership and subscriptions.
//!
//! Each relation kind is a set of `(user, target)` pairs backed by its own
//! uniqueness-constrained table. For favorites and the cart the target is a
//! recipe; for subscriptions it is the followed author.
//!
//! The toggle rules live here so they can be exercised without a database.
//! Storage goes through [`RelationStore`], implemented by the server on top of
//! diesel and by [`MemoryRelationStore`] for tests.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{RelationError, StoreError};

pub type UserId = i32;
pub type RecipeId = i32;

pub const SELF_SUBSCRIPTION: &str = "Cannot subscribe to yourself";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Favorite,
    Cart,
    Subscription,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Favorite,
        RelationKind::Cart,
        RelationKind::Subscription,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorite",
            RelationKind::Cart => "cart",
            RelationKind::Subscription => "subscription",
        }
    }

    /// Message for an add of a pair that is already present.
    pub fn duplicate_message(self) -> &'static str {
        match self {
            RelationKind::Favorite => "Recipe is already in favorites",
            RelationKind::Cart => "Recipe is already in the shopping cart",
            RelationKind::Subscription => "Already subscribed to this user",
        }
    }

    /// Message for a remove of a pair that is not present.
    pub fn missing_message(self) -> &'static str {
        match self {
            RelationKind::Favorite => "Recipe is not in favorites",
            RelationKind::Cart => "Recipe is not in the shopping cart",
            RelationKind::Subscription => "Not subscribed to this user",
        }
    }
}

/// Minimal repository over the three relation tables.
pub trait RelationStore {
    fn contains(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<bool, StoreError>;

    /// Insert the pair. Must report [`StoreError::UniqueViolation`] when the
    /// pair already exists.
    fn insert(&mut self, kind: RelationKind, user_id: UserId, target_id: i32)
        -> Result<(), StoreError>;

    /// Delete the pair, returning the number of rows removed.
    fn delete(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<usize, StoreError>;
}

/// Create the `(user_id, target_id)` relation of the given kind.
///
/// Self-subscription is rejected before the store is consulted, so it fails
/// with `Conflict` regardless of prior state.
pub fn add<S>(
    store: &mut S,
    kind: RelationKind,
    user_id: UserId,
    target_id: i32,
) -> Result<(), RelationError>
where
    S: RelationStore + ?Sized,
{
    if kind == RelationKind::Subscription && user_id == target_id {
        return Err(RelationError::Conflict(SELF_SUBSCRIPTION));
    }

    if store.contains(kind, user_id, target_id)? {
        return Err(RelationError::Conflict(kind.duplicate_message()));
    }

    match store.insert(kind, user_id, target_id) {
        Ok(()) => {
            tracing::debug!(kind = kind.as_str(), user_id, target_id, "relation added");
            Ok(())
        }
        Err(StoreError::UniqueViolation) => {
            tracing::debug!(
                kind = kind.as_str(),
                user_id,
                target_id,
                "concurrent add lost the race"
            );
            Err(RelationError::Conflict(kind.duplicate_message()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete the `(user_id, target_id)` relation of the given kind.
pub fn remove<S>(
    store: &mut S,
    kind: RelationKind,
    user_id: UserId,
    target_id: i32,
) -> Result<(), RelationError>
where
    S: RelationStore + ?Sized,
{
    match store.delete(kind, user_id, target_id)? {
        0 => Err(RelationError::NotFound(kind.missing_message())),
        _ => {
            tracing::debug!(kind = kind.as_str(), user_id, target_id, "relation removed");
            Ok(())
        }
    }
}

/// In-memory relation store for tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct MemoryRelationStore {
    rows: HashSet<(RelationKind, UserId, i32)>,
}

impl MemoryRelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Targets of `kind` held by `user_id`, sorted.
    pub fn targets(&self, kind: RelationKind, user_id: UserId) -> Vec<i32> {
        let mut targets: Vec<i32> = self
            .rows
            .iter()
            .filter(|(k, u, _)| *k == kind && *u == user_id)
            .map(|(_, _, t)| *t)
            .collect();
        targets.sort_unstable();
        targets
    }
}

impl RelationStore for MemoryRelationStore {
    fn contains(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<bool, StoreError> {
        Ok(self.rows.contains(&(kind, user_id, target_id)))
    }

    fn insert(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<(), StoreError> {
        if self.rows.insert((kind, user_id, target_id)) {
            Ok(())
        } else {
            Err(StoreError::UniqueViolation)
        }
    }

    fn delete(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<usize, StoreError> {
        Ok(usize::from(self.rows.remove(&(kind, user_id, target_id))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose existence check always misses, simulating two adds that
    /// both pass the check before either inserts.
    struct RacingStore(MemoryRelationStore);

    impl RelationStore for RacingStore {
        fn contains(&mut self, _: RelationKind, _: UserId, _: i32) -> Result<bool, StoreError> {
            Ok(false)
        }

        fn insert(&mut self, kind: RelationKind, user_id: UserId, target_id: i32) -> Result<(), StoreError> {
            self.0.insert(kind, user_id, target_id)
        }

        fn delete(&mut self, kind: RelationKind, user_id: UserId, target_id: i32) -> Result<usize, StoreError> {
            self.0.delete(kind, user_id, target_id)
        }
    }

    struct BrokenStore;

    impl RelationStore for BrokenStore {
        fn contains(&mut self, _: RelationKind, _: UserId, _: i32) -> Result<bool, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }

        fn insert(&mut self, _: RelationKind, _: UserId, _: i32) -> Result<(), StoreError> {
            unreachable!()
        }

        fn delete(&mut self, _: RelationKind, _: UserId, _: i32) -> Result<usize, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }
    }

    #[test]
    fn test_add_twice_conflicts() {
        let mut store = MemoryRelationStore::new();
        add(&mut store, RelationKind::Favorite, 1, 10).unwrap();

        let err = add(&mut store, RelationKind::Favorite, 1, 10).unwrap_err();
        assert_eq!(err, RelationError::Conflict("Recipe is already in favorites"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_without_add_is_not_found() {
        let mut store = MemoryRelationStore::new();
        let err = remove(&mut store, RelationKind::Favorite, 1, 10).unwrap_err();
        assert_eq!(err, RelationError::NotFound("Recipe is not in favorites"));
    }

    #[test]
    fn test_add_then_remove_then_add_again() {
        let mut store = MemoryRelationStore::new();
        add(&mut store, RelationKind::Cart, 1, 10).unwrap();
        remove(&mut store, RelationKind::Cart, 1, 10).unwrap();
        assert!(store.is_empty());
        add(&mut store, RelationKind::Cart, 1, 10).unwrap();
        assert_eq!(store.targets(RelationKind::Cart, 1), vec![10]);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut store = MemoryRelationStore::new();
        add(&mut store, RelationKind::Favorite, 1, 10).unwrap();
        add(&mut store, RelationKind::Cart, 1, 10).unwrap();
        add(&mut store, RelationKind::Subscription, 1, 10).unwrap();
        assert_eq!(store.len(), 3);

        remove(&mut store, RelationKind::Cart, 1, 10).unwrap();
        assert_eq!(store.targets(RelationKind::Favorite, 1), vec![10]);
        assert!(store.targets(RelationKind::Cart, 1).is_empty());
    }

    #[test]
    fn test_self_subscription_always_conflicts() {
        let mut store = MemoryRelationStore::new();
        let err = add(&mut store, RelationKind::Subscription, 5, 5).unwrap_err();
        assert_eq!(err, RelationError::Conflict(SELF_SUBSCRIPTION));

        // Even when the row somehow exists already.
        store.insert(RelationKind::Subscription, 5, 5).unwrap();
        let err = add(&mut store, RelationKind::Subscription, 5, 5).unwrap_err();
        assert_eq!(err, RelationError::Conflict(SELF_SUBSCRIPTION));
    }

    #[test]
    fn test_self_favorite_is_allowed() {
        // Only subscriptions forbid user == target; a recipe id may equal a user id.
        let mut store = MemoryRelationStore::new();
        add(&mut store, RelationKind::Favorite, 5, 5).unwrap();
    }

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let mut store = RacingStore(MemoryRelationStore::new());
        add(&mut store, RelationKind::Subscription, 1, 2).unwrap();

        let err = add(&mut store, RelationKind::Subscription, 1, 2).unwrap_err();
        assert_eq!(err, RelationError::Conflict("Already subscribed to this user"));
    }

    #[test]
    fn test_backend_errors_propagate() {
        let err = add(&mut BrokenStore, RelationKind::Favorite, 1, 2).unwrap_err();
        assert!(matches!(err, RelationError::Store(StoreError::Backend(_))));

        let err = remove(&mut BrokenStore, RelationKind::Favorite, 1, 2).unwrap_err();
        assert!(matches!(err, RelationError::Store(StoreError::Backend(_))));
    }

    #[test]
    fn test_messages_differ_per_kind() {
        let messages: HashSet<&str> = RelationKind::ALL
            .iter()
            .flat_map(|k| [k.duplicate_message(), k.missing_message()])
            .collect();
        assert_eq!(messages.len(), 6);
    }
}
