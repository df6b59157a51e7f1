//! Diesel-backed [`RelationStore`] over the favorites, shopping_carts and
//! subscriptions tables.

use crate::db::is_unique_violation;
use crate::schema::{favorites, shopping_carts, subscriptions};
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use foodgram_core::{RelationKind, RelationStore, StoreError, UserId};

pub struct PgRelationStore<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgRelationStore<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }
}

fn store_error(err: diesel::result::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::UniqueViolation
    } else {
        StoreError::Backend(err.to_string())
    }
}

impl RelationStore for PgRelationStore<'_> {
    fn contains(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<bool, StoreError> {
        let query = match kind {
            RelationKind::Favorite => select(exists(
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .filter(favorites::recipe_id.eq(target_id)),
            ))
            .get_result(self.conn),
            RelationKind::Cart => select(exists(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .filter(shopping_carts::recipe_id.eq(target_id)),
            ))
            .get_result(self.conn),
            RelationKind::Subscription => select(exists(
                subscriptions::table
                    .filter(subscriptions::user_id.eq(user_id))
                    .filter(subscriptions::author_id.eq(target_id)),
            ))
            .get_result(self.conn),
        };
        query.map_err(store_error)
    }

    fn insert(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<(), StoreError> {
        let inserted = match kind {
            RelationKind::Favorite => diesel::insert_into(favorites::table)
                .values((
                    favorites::user_id.eq(user_id),
                    favorites::recipe_id.eq(target_id),
                ))
                .execute(self.conn),
            RelationKind::Cart => diesel::insert_into(shopping_carts::table)
                .values((
                    shopping_carts::user_id.eq(user_id),
                    shopping_carts::recipe_id.eq(target_id),
                ))
                .execute(self.conn),
            RelationKind::Subscription => diesel::insert_into(subscriptions::table)
                .values((
                    subscriptions::user_id.eq(user_id),
                    subscriptions::author_id.eq(target_id),
                ))
                .execute(self.conn),
        };
        inserted.map(|_| ()).map_err(store_error)
    }

    fn delete(
        &mut self,
        kind: RelationKind,
        user_id: UserId,
        target_id: i32,
    ) -> Result<usize, StoreError> {
        let deleted = match kind {
            RelationKind::Favorite => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(user_id))
                    .filter(favorites::recipe_id.eq(target_id)),
            )
            .execute(self.conn),
            RelationKind::Cart => diesel::delete(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(user_id))
                    .filter(shopping_carts::recipe_id.eq(target_id)),
            )
            .execute(self.conn),
            RelationKind::Subscription => diesel::delete(
                subscriptions::table
                    .filter(subscriptions::user_id.eq(user_id))
                    .filter(subscriptions::author_id.eq(target_id)),
            )
            .execute(self.conn),
        };
        deleted.map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error};

    struct Info;

    impl DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            Some("favorites")
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            Some("favorites_pkey")
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    #[test]
    fn test_unique_violation_maps_to_store_conflict() {
        let err = Error::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(Info));
        assert_eq!(store_error(err), StoreError::UniqueViolation);
    }

    #[test]
    fn test_other_errors_are_backend_failures() {
        assert!(matches!(store_error(Error::NotFound), StoreError::Backend(_)));
    }
}
