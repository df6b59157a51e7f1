use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;
    if !applied.is_empty() {
        tracing::info!("Applied {} database migration(s)", applied.len());
    }

    Ok(pool)
}

/// Borrow a pooled connection inside a handler returning `Result<_, ApiError>`.
#[macro_export]
macro_rules! get_conn {
    ($pool:expr) => {
        match $pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get database connection: {}", e);
                return Err($crate::api::ApiError::internal("Database connection failed"));
            }
        }
    };
}

/// True when the diesel error is a unique-constraint violation.
pub fn is_unique_violation(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        )
    )
}

/// Database fixtures for tests that need PostgreSQL.
///
/// Tests call [`testing::test_connection`] and return early when
/// `TEST_DATABASE_URL` is unset. Each connection runs inside a test
/// transaction that is never committed.
#[cfg(test)]
pub mod testing {
    use super::MIGRATIONS;
    use crate::models::{NewImage, NewRecipe, NewUser};
    use crate::schema::{images, recipes, users};
    use diesel::prelude::*;
    use diesel_migrations::MigrationHarness;
    use std::sync::Once;
    use uuid::Uuid;

    static MIGRATE: Once = Once::new();

    pub fn test_connection() -> Option<PgConnection> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        MIGRATE.call_once(|| {
            let mut conn = PgConnection::establish(&url).expect("connect to test database");
            conn.run_pending_migrations(MIGRATIONS)
                .expect("migrate test database");
        });
        let mut conn = PgConnection::establish(&url).expect("connect to test database");
        conn.begin_test_transaction()
            .expect("begin test transaction");
        Some(conn)
    }

    /// Short random suffix for values under a unique constraint.
    pub fn unique(prefix: &str) -> String {
        format!("{}-{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
    }

    pub fn insert_user(conn: &mut PgConnection) -> i32 {
        let username = unique("cook");
        let email = format!("{}@example.com", username);
        diesel::insert_into(users::table)
            .values(&NewUser {
                email: &email,
                username: &username,
                first_name: "Test",
                last_name: "Cook",
                password_hash: "",
            })
            .returning(users::id)
            .get_result(conn)
            .unwrap()
    }

    pub fn insert_image(conn: &mut PgConnection, user_id: i32) -> Uuid {
        diesel::insert_into(images::table)
            .values(&NewImage {
                user_id,
                content_type: "image/png",
                data: b"png",
            })
            .returning(images::id)
            .get_result(conn)
            .unwrap()
    }

    pub fn insert_recipe(conn: &mut PgConnection, author_id: i32, image_id: Uuid) -> i32 {
        diesel::insert_into(recipes::table)
            .values(&NewRecipe {
                author_id,
                name: "Soup",
                text: "Boil.",
                image_id,
                cooking_time: 10,
            })
            .returning(recipes::id)
            .get_result(conn)
            .unwrap()
    }
}
