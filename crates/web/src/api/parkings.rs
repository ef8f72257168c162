use annotations::database::Database;
use axum::{
    extract::{OriginalUri, State},
    http::Method,
    routing::{get, on, post},
    Json, Router,
};
use model::{parking::Parking, WithId};
use serde::Deserialize;
use utility::id::Id;

use crate::{
    common::{route_not_found, schema, Body, RouteErrorResponse, RouteResult, METHOD_FILTER_ALL},
    WebState,
};

#[derive(Debug, Deserialize)]
pub(crate) struct DeleteParking {
    id: Id<Parking>,
}

pub(crate) fn routes<D: Database>(state: WebState<D>) -> Router {
    Router::new()
        .route("/schema", get(schema::<Parking>))
        .route("/all", get(get_parkings::<D>))
        .route("/parking", post(create_parking::<D>).delete(delete_parking::<D>))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn get_parkings<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
) -> RouteResult<Json<Vec<WithId<Parking>>>> {
    client.get_parkings().await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::GET)
            .with_uri(original_uri.path())
    })
}

async fn create_parking<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Body(parking): Body<Parking>,
) -> RouteResult<Json<WithId<Parking>>> {
    client.create_parking(parking).await.map(Json).map_err(|why| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    })
}

async fn delete_parking<D: Database>(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { client }): State<WebState<D>>,
    Body(DeleteParking { id }): Body<DeleteParking>,
) -> RouteResult<Json<&'static str>> {
    client
        .delete_parking(id)
        .await
        .map(|_| Json("Parking deleted"))
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::DELETE)
                .with_uri(original_uri.path())
        })
}
