//! Library store
//!
//! Queries over the shared schema created by
//! [`discshelf_common::db::init_schema`].

pub mod albums;
pub mod artists;
pub mod settings;
pub mod tracks;

/// Single-connection in-memory pool with the full schema
///
/// One connection only: every `:memory:` connection is its own database.
#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    discshelf_common::db::init_schema(&pool)
        .await
        .expect("Failed to initialize schema");

    pool
}
