use annotations::database::Database;
use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::{
    middleware::auth::{require_token, ApiToken},
    WebState,
};

mod markers;
mod parkings;

pub fn routes<D: Database>(state: WebState<D>, token: ApiToken) -> Router {
    let resources = Router::new()
        .nest("/markers", markers::routes(state.clone()))
        .nest("/parkings", parkings::routes(state))
        .layer(axum::middleware::from_fn_with_state(token, require_token));

    Router::new().route("/ping", get(ping)).merge(resources)
}

async fn ping() -> impl IntoResponse {
    Json(json!({
        "message": "pong!"
    }))
}

#[cfg(test)]
mod tests {
    use annotations::memory::MemoryDatabase;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::routes;
    use crate::{middleware::auth::ApiToken, WebState};

    fn app(token: Option<&str>) -> Router {
        routes(
            WebState::new(MemoryDatabase::new()),
            ApiToken::new(token.map(str::to_owned)),
        )
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = body.map(|body| body.to_string()).unwrap_or_default();
        let response = app
            .clone()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn example_parking() -> Value {
        json!({
            "price": 300,
            "edges": [
                { "lat": 45.0, "lng": 15.0 },
                { "lat": 45.1, "lng": 15.0 },
                { "lat": 45.1, "lng": 15.1 }
            ]
        })
    }

    #[tokio::test]
    async fn ping_answers() {
        let (status, body) = send(&app(None), Method::GET, "/ping", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "pong!");
    }

    #[tokio::test]
    async fn parking_lifecycle() {
        let app = app(None);

        let (status, created) = send(
            &app,
            Method::POST,
            "/parkings/parking",
            Some(example_parking()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["_id"].as_str().unwrap().to_owned();
        assert_eq!(created["price"], json!(300.0));
        assert_eq!(created["edges"], example_parking()["edges"]);

        let (status, all) = send(&app, Method::GET, "/parkings/all", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 1);
        assert_eq!(all[0]["_id"], json!(id));

        let (status, confirmation) = send(
            &app,
            Method::DELETE,
            "/parkings/parking",
            Some(json!({ "id": id })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmation, json!("Parking deleted"));

        let (_, all) = send(&app, Method::GET, "/parkings/all", None, None).await;
        assert_eq!(all, json!([]));
    }

    #[tokio::test]
    async fn missing_field_gets_a_structured_error() {
        let app = app(None);
        let (status, body) = send(
            &app,
            Method::POST,
            "/parkings/parking",
            Some(json!({ "edges": example_parking()["edges"] })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detailedInformation"].as_str().unwrap().contains("price"));
    }

    #[tokio::test]
    async fn too_small_parking_is_rejected() {
        let app = app(None);
        let (status, body) = send(
            &app,
            Method::POST,
            "/parkings/parking",
            Some(json!({ "price": 300, "edges": [{ "lat": 45.0, "lng": 15.0 }] })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["httpMethod"], "POST");
        assert_eq!(body["requestedUri"], "/parkings/parking");
        assert!(body["detailedInformation"].as_str().unwrap().contains("edges"));

        let (_, all) = send(&app, Method::GET, "/parkings/all", None, None).await;
        assert_eq!(all, json!([]));
    }

    #[tokio::test]
    async fn marker_lifecycle() {
        let app = app(None);
        let marker = json!({
            "type": "H",
            "name": "Hydrant",
            "price": 450,
            "coordinates": { "lat": 45.80724, "lng": 15.96757 }
        });

        let (status, created) =
            send(&app, Method::POST, "/markers/marker", Some(marker), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["type"], "H");
        let id = created["_id"].clone();

        let (status, confirmation) = send(
            &app,
            Method::DELETE,
            "/markers/marker",
            Some(json!({ "id": id })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmation, json!("Marker deleted"));

        let (status, _) = send(
            &app,
            Method::DELETE,
            "/markers/marker",
            Some(json!({ "id": id })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = app(None);
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/markers/marker")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn resources_require_the_configured_token() {
        let app = app(Some("s3cret"));

        let (status, body) = send(&app, Method::GET, "/markers/all", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["requestedUri"], "/markers/all");

        let (status, _) =
            send(&app, Method::GET, "/markers/all", None, Some("guess")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) =
            send(&app, Method::GET, "/markers/all", None, Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = send(&app, Method::GET, "/ping", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_resource_route_is_not_found() {
        let (status, body) =
            send(&app(None), Method::GET, "/markers/nothing", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Not Found");
    }
}
