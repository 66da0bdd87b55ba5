pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub use application::orchestrator::OrderOrchestrator;
pub use config::Config;
pub use db::{create_pool, DbPool};
use infrastructure::events::KafkaEventEmitter;
use infrastructure::identity::HttpIdentityClient;
use infrastructure::inventory::HttpInventoryClient;
use infrastructure::order_ledger::DieselOrderLedger;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// The orchestrator wired to its production adapters.
pub type AppOrchestrator =
    OrderOrchestrator<DieselOrderLedger, HttpIdentityClient, HttpInventoryClient, KafkaEventEmitter>;

/// Build the production orchestrator from config and an established pool.
pub fn build_orchestrator(pool: DbPool, config: &Config) -> AppOrchestrator {
    OrderOrchestrator::new(
        DieselOrderLedger::new(pool),
        HttpIdentityClient::new(&config.user_service_url, config.http_timeout),
        HttpInventoryClient::new(&config.product_service_url, config.http_timeout),
        KafkaEventEmitter::new(&config.kafka_brokers, &config.events_topic),
    )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    orchestrator: AppOrchestrator,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let orchestrator = web::Data::new(orchestrator);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(orchestrator.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/details",
                        web::get().to(handlers::orders::get_order_details),
                    )
                    .route("/{id}/cancel", web::post().to(handlers::orders::cancel_order))
                    .route("/{id}/pay", web::post().to(handlers::orders::pay_order)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
