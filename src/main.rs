use dotenvy::dotenv;
use order_orchestrator::{build_orchestrator, build_server, create_pool, run_migrations, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::load();
    let pool = create_pool(&config.database_url);
    run_migrations(&pool);

    let orchestrator = build_orchestrator(pool, &config);

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(orchestrator, &config.host, config.port)?.await
}
