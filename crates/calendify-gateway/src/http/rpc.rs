use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use calendify_protocol::frames::ResFrame;
use std::sync::Arc;
use tracing::debug;

use crate::app::AppState;
use crate::auth;
use crate::ws::dispatch;

/// POST /rpc/{method}: one RPC call over plain HTTP.
///
/// The body is the params object (may be empty). The response body is always
/// a `ResFrame`; the status code mirrors its error code. `x-request-id`, when
/// present, becomes the frame id.
pub async fn rpc_handler(
    State(app): State<Arc<AppState>>,
    Path(method): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<ResFrame>) {
    let req_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let caller = match auth::authenticate_http(&headers, &app) {
        Ok(user) => user,
        Err(e) => return respond(ResFrame::from_error(&req_id, &e)),
    };

    let params: Option<serde_json::Value> = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => Some(v),
            Err(e) => {
                return respond(ResFrame::err(
                    &req_id,
                    "INVALID_PARAMS",
                    &format!("body is not valid JSON: {e}"),
                ))
            }
        }
    };

    debug!(method = %method, user_id = %caller.id, "http rpc");
    let res = dispatch::route(&method, params.as_ref(), &req_id, &app, &caller).await;
    respond(res)
}

fn respond(res: ResFrame) -> (StatusCode, Json<ResFrame>) {
    let status = res.error_code().map_or(StatusCode::OK, status_for_code);
    (status, Json(res))
}

/// HTTP status for a wire error code.
pub fn status_for_code(code: &str) -> StatusCode {
    match code {
        "NOT_FOUND" | "METHOD_NOT_FOUND" => StatusCode::NOT_FOUND,
        "INVALID_PARAMS" => StatusCode::BAD_REQUEST,
        "CONFLICT" => StatusCode::CONFLICT,
        "AUTH_FAILED" => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{build_router, test_state};
    use axum::body::Body;
    use axum::http::Request;
    use calendify_core::config::AuthMode;
    use tower::ServiceExt;

    async fn call(
        router: axum::Router,
        method: &str,
        headers: &[(&str, &str)],
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = Request::post(format!("/rpc/{method}"));
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        let res = router
            .oneshot(req.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_for_code("NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_code("METHOD_NOT_FOUND"), StatusCode::NOT_FOUND);
        assert_eq!(status_for_code("INVALID_PARAMS"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for_code("CONFLICT"), StatusCode::CONFLICT);
        assert_eq!(status_for_code("AUTH_FAILED"), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for_code("DATABASE_ERROR"),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn empty_body_is_no_params() {
        let router = build_router(test_state(AuthMode::None));
        let (status, body) = call(router, "stores.getAll", &[("x-request-id", "r-1")], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "r-1");
        assert_eq!(body["ok"], true);
        assert_eq!(body["payload"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn token_mode_requires_bearer() {
        let router = build_router(test_state(AuthMode::Token));
        let (status, body) = call(router, "stores.getAll", &[], "").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTH_FAILED");
    }

    #[tokio::test]
    async fn create_then_fetch_over_http() {
        let state = test_state(AuthMode::None);
        let (status, created) = call(
            build_router(state.clone()),
            "stores.create",
            &[],
            r#"{"storeNumber": 12, "name": "Downtown", "location": "Main St"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["payload"]["id"].as_str().unwrap().to_string();

        let (status, fetched) = call(
            build_router(state),
            "stores.getById",
            &[],
            &format!(r#"{{"id": "{id}"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["payload"]["storeNumber"], 12);
        assert_eq!(fetched["payload"]["employees"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn bad_json_and_unknown_method() {
        let state = test_state(AuthMode::None);
        let (status, body) = call(build_router(state.clone()), "stores.create", &[], "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_PARAMS");

        let (status, body) = call(build_router(state), "stores.delete", &[], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "METHOD_NOT_FOUND");
    }
}
