use lambda_http::{http::StatusCode, Body, Error, Response};
use serde::{de::DeserializeOwned, Serialize};
use workshop_shared::error::WorkshopError;

pub(crate) type HandlerResult = Result<Response<Body>, WorkshopError>;

pub(crate) fn json<T: Serialize>(status: StatusCode, value: &T) -> HandlerResult {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(value)?.into())
        .map_err(|e| WorkshopError::backend("Failed to build response", e))
}

pub(crate) fn ok<T: Serialize>(value: &T) -> HandlerResult {
    json(StatusCode::OK, value)
}

pub(crate) fn created<T: Serialize>(value: &T) -> HandlerResult {
    json(StatusCode::CREATED, value)
}

pub(crate) fn message(text: &str) -> HandlerResult {
    ok(&serde_json::json!({ "message": text }))
}

pub(crate) fn no_content() -> HandlerResult {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Empty)
        .map_err(|e| WorkshopError::backend("Failed to build response", e))
}

/// Raw file bytes with a long-lived cache header.
pub(crate) fn file(content_type: &str, bytes: Vec<u8>) -> HandlerResult {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Access-Control-Allow-Origin", "*")
        .header("Cache-Control", "public, max-age=31536000, immutable")
        .body(bytes.into())
        .map_err(|e| WorkshopError::backend("Failed to build response", e))
}

pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, WorkshopError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Failed to parse request body: {}", e);
        WorkshopError::Validation(format!("Invalid request body: {}", e))
    })
}

pub(crate) fn cors_preflight() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Allow-Methods",
            "GET,POST,PUT,PATCH,DELETE,OPTIONS",
        )
        .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
        .body(Body::Empty)
        .map_err(Box::new)?)
}

pub(crate) fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "NotFound", "message": "Not found"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}

/// Map a domain error onto its status code and JSON body.
pub(crate) fn error(err: &WorkshopError) -> Result<Response<Body>, Error> {
    let status = err.status_code();
    if status.is_server_error() {
        tracing::error!("Request failed: {:?}", err);
    } else {
        tracing::warn!("Request refused ({}): {}", status, err);
    }

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&err.to_response())?.into())
        .map_err(Box::new)?)
}
