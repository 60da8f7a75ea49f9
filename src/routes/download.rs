use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::Response,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppState, config::RepoTarget, error::ApiError, github};

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    owner: Option<String>,
    repo: Option<String>,
}

impl DownloadQuery {
    fn target(&self) -> Option<RepoTarget> {
        RepoTarget::parse(self.owner.as_deref()?, self.repo.as_deref()?)
    }
}

pub async fn download_handler(
    _: super::DownloadPath,
    State(state): State<AppState>,
    query: Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        warn!("unreadable query string: {}", e);
        ApiError::MissingTarget
    })?;
    let target = query.target().ok_or_else(|| {
        warn!(owner = ?query.owner, repo = ?query.repo, "invalid download target");
        ApiError::MissingTarget
    })?;
    info!("downloading {} from repo {}", state.settings.query_path, target);

    let value =
        github::fetch_json_file(&state.settings, &target, &state.settings.query_path).await?;

    Ok(super::json_file_response(value))
}
