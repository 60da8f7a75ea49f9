use base64::Engine;
use octocrab::service::middleware::retry::RetryConfig;
use serde::Serialize;
use tracing::{error, info, instrument};

use super::{
    auth::InstallationToken,
    models::{ContentFile, Installation},
};
use crate::error::FetchError;

const INSTALLATIONS_PER_PAGE: usize = 100;

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(Clone)]
pub struct GitHubClient {
    pub octocrab: octocrab::Octocrab,
}

impl GitHubClient {
    pub fn new(base_url: &str, bearer: &str) -> Result<Self, FetchError> {
        let octocrab = octocrab::Octocrab::builder()
            .base_uri(base_url)
            .map_err(|e| FetchError::Config(format!("invalid GITHUB_API_URL {base_url}: {e}")))?
            .personal_token(bearer.to_string())
            .add_retry_config(RetryConfig::None)
            .build()
            .map_err(|e| {
                error!("failed to build octocrab client: {:?}", e);
                FetchError::from(e)
            })?;

        Ok(Self { octocrab })
    }

    #[instrument(skip(self))]
    pub async fn repository_installation(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Installation, octocrab::Error> {
        self.octocrab
            .get(format!("/repos/{owner}/{repo}/installation"), None::<&()>)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_installations(&self) -> Result<Vec<Installation>, octocrab::Error> {
        let mut installations = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<Installation> = self
                .octocrab
                .get(
                    "/app/installations",
                    Some(&PageParams {
                        per_page: INSTALLATIONS_PER_PAGE,
                        page,
                    }),
                )
                .await?;
            let done = batch.len() < INSTALLATIONS_PER_PAGE;
            installations.extend(batch);
            if done {
                break;
            }
            page += 1;
        }
        info!(count = installations.len(), "listed app installations");
        Ok(installations)
    }

    #[instrument(skip(self))]
    pub async fn create_installation_token(
        &self,
        installation_id: u64,
    ) -> Result<InstallationToken, FetchError> {
        let token: InstallationToken = self
            .octocrab
            .post(
                format!("/app/installations/{installation_id}/access_tokens"),
                None::<&()>,
            )
            .await
            .map_err(|e| {
                error!("failed to create installation token: {:?}", e);
                FetchError::from(e)
            })?;
        info!(expires_at = ?token.expires_at, "created installation token");
        Ok(token)
    }

    #[instrument(skip(self))]
    pub async fn file_contents(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
    ) -> Result<serde_json::Value, FetchError> {
        let path = path.trim_start_matches('/');
        let file: ContentFile = self
            .octocrab
            .get(format!("/repos/{owner}/{repo}/contents/{path}"), None::<&()>)
            .await
            .map_err(|e| {
                error!("failed to get file contents: {:?}", e);
                FetchError::from(e)
            })?;
        info!(path = ?file.path, sha = ?file.sha, size = file.size, "fetched file contents");

        decode_json_content(&file)
    }
}

/// Decodes the Base64 `content` of a contents-API file and parses it as JSON.
pub fn decode_json_content(file: &ContentFile) -> Result<serde_json::Value, FetchError> {
    match file.encoding.as_deref() {
        None | Some("base64") => {}
        Some(other) => {
            return Err(FetchError::Decode(format!(
                "unsupported content encoding `{other}` (files over 1 MB are not inlined)"
            )));
        }
    }

    let encoded: String = file
        .content
        .as_deref()
        .ok_or_else(|| FetchError::Decode(String::from("response has no content field")))?
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| FetchError::Decode(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| FetchError::Decode(e.to_string()))?;

    Ok(serde_json::from_str(&text)?)
}
