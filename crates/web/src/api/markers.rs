use annotations::database::Database;
use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on, post},
    Json, Router,
};
use model::{marker::Marker, WithId};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{route_not_found, schema, Body, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteMarker {
    id: Id<Marker>,
}

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Marker>))
        .route("/all", get(get_markers::<D>))
        .route("/marker", post(create_marker::<D>).delete(delete_marker::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_markers<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<Json<Vec<WithId<Marker>>>> {
    client.get_markers().await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })
}

async fn create_marker<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Body(marker): Body<Marker>,
) -> RouteResult<Json<WithId<Marker>>> {
    client.create_marker(marker).await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    })
}

async fn delete_marker<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Body(DeleteMarker { id }): Body<DeleteMarker>,
) -> RouteResult<Json<&'static str>> {
    client
        .delete_marker(id)
        .await
        .map(|_| Json("Marker deleted"))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}
