use axum::{extract::State, response::Response};
use tracing::info;

use crate::{AppState, error::{ApiError, FetchError}, github};

pub async fn data_handler(
    _: super::DataPath,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let target = state.settings.target.as_ref().ok_or_else(|| {
        FetchError::Config(String::from(
            "GITHUB_TARGET_OWNER and GITHUB_TARGET_REPO must be set",
        ))
    })?;
    info!("downloading {} from repo {}", state.settings.target_path, target);

    let value =
        github::fetch_json_file(&state.settings, target, &state.settings.target_path).await?;

    Ok(super::json_file_response(value))
}
