use axum::{
    Json,
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::routing::TypedPath;
use serde::Deserialize;

pub mod data;
pub mod download;
pub mod health;

#[derive(TypedPath, Deserialize)]
#[typed_path("/download")]
pub struct DownloadPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/data")]
pub struct DataPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/health")]
pub struct HealthPath;

pub(crate) fn json_file_response(value: serde_json::Value) -> Response {
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(value),
    )
        .into_response()
}
