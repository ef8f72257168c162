pub use crate::common::RouteResult;

use std::{env, net::SocketAddr};

use annotations::{client::Client, database::Database};
use axum::Router;
use middleware::auth::ApiToken;
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod api;
pub mod common;
pub mod middleware;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Clone)]
pub struct WebState<D>
where
    D: Database,
{
    pub client: Client<D>,
}

impl<D: Database> WebState<D> {
    pub fn new(database: D) -> Self {
        Self {
            client: Client::new(database),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind_address: SocketAddr,
    pub api_token: Option<String>,
    pub static_dir: String,
}

impl WebConfig {
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        let bind_address = env::var("BIND_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_owned())
            .parse()?;
        let api_token = env::var("API_TOKEN").ok().filter(|token| !token.is_empty());
        let static_dir =
            env::var("STATIC_DIR").unwrap_or_else(|_| "./resources/www/".to_owned());
        Ok(Self {
            bind_address,
            api_token,
            static_dir,
        })
    }
}

pub fn app<D: Database>(state: WebState<D>, config: &WebConfig) -> Router {
    if config.api_token.is_none() {
        log::warn!("API_TOKEN is not set, resources are served without authentication");
    }
    api::routes(state, ApiToken::new(config.api_token.clone()))
        .fallback_service(static_content_router(&config.static_dir))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub async fn start_web_server<D: Database>(
    state: WebState<D>,
    config: WebConfig,
) -> std::io::Result<()> {
    let routes = app(state, &config);

    let listener = TcpListener::bind(config.bind_address).await?;
    log::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}

fn static_content_router(directory: &str) -> Router {
    let not_found = format!("{}/error404.html", directory.trim_end_matches('/'));
    Router::new().fallback_service(
        ServeDir::new(directory).not_found_service(ServeFile::new(not_found)),
    )
}
