mod auth;
mod client;
mod installation;
pub mod models;

pub use auth::{AppClaims, AppToken, InstallationToken};
pub use client::{GitHubClient, decode_json_content};

use tracing::{info, instrument};

use crate::{
    config::{AppCredentials, RepoTarget, Settings},
    error::FetchError,
};

#[instrument(
    skip(settings, target),
    fields(target = %target, lookup = ?settings.installation_lookup)
)]
pub async fn fetch_json_file(
    settings: &Settings,
    target: &RepoTarget,
    path: &str,
) -> Result<serde_json::Value, FetchError> {
    let credentials = AppCredentials::from_settings(settings)?;
    let app_token = AppToken::issue(&credentials)?;

    let app_client = GitHubClient::new(&settings.github_api_url, app_token.as_str())?;
    let installation_id = settings
        .installation_lookup
        .resolve(&app_client, target)
        .await?;
    let installation_token = app_client
        .create_installation_token(installation_id)
        .await?;

    let repo_client = GitHubClient::new(&settings.github_api_url, installation_token.as_str())?;
    let value = repo_client
        .file_contents(&target.owner, &target.repo, path)
        .await?;
    info!(path, "served file");

    Ok(value)
}
