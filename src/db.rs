use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};

/// r2d2 pool over the Postgres store backing `orders` and `order_items`.
pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Build the connection pool for the order store. Connections are handed to
/// `spawn_blocking` workers, so the pool is shared across the async runtime.
pub fn create_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .expect("Failed to create database connection pool")
}
