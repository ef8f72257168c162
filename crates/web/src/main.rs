use annotations::memory::MemoryDatabase;
use database::{DatabaseConnectionInfo, PgDatabase};
use tracing_subscriber::EnvFilter;
use web::{start_web_server, WebConfig, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = WebConfig::from_env().expect("BIND_ADDRESS is not a socket address.");

    // database
    let result = match DatabaseConnectionInfo::from_env() {
        Some(database_connection_info) => {
            let database = PgDatabase::connect(database_connection_info)
                .await
                .expect("could not connect to database.");
            start_web_server(WebState::new(database), config).await
        }
        None => {
            log::warn!("no database configured, annotations are kept in memory only");
            start_web_server(WebState::new(MemoryDatabase::new()), config).await
        }
    };

    if let Err(why) = result {
        log::error!("web server stopped: {}", why);
    }
}
