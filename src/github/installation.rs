use axum::http::StatusCode;
use tracing::{error, info, instrument};

use super::{client::GitHubClient, models::Installation};
use crate::{
    config::{InstallationLookup, RepoTarget},
    error::FetchError,
};

impl InstallationLookup {
    #[instrument(skip(client, target), fields(target = %target))]
    pub async fn resolve(
        self,
        client: &GitHubClient,
        target: &RepoTarget,
    ) -> Result<u64, FetchError> {
        let installation = match self {
            InstallationLookup::Repository => {
                match client
                    .repository_installation(&target.owner, &target.repo)
                    .await
                {
                    Ok(installation) => Some(installation),
                    Err(e) => match FetchError::from(e) {
                        FetchError::Upstream { status, .. } if status == StatusCode::NOT_FOUND => {
                            None
                        }
                        other => return Err(other),
                    },
                }
            }
            InstallationLookup::Account => {
                let installations = client.list_installations().await?;
                find_by_login(installations, &target.owner)
            }
        };

        let Some(installation) = installation else {
            error!(owner = %target.owner, "no installation found for target");
            return Err(FetchError::NotInstalled {
                target: match self {
                    InstallationLookup::Repository => target.to_string(),
                    InstallationLookup::Account => target.owner.clone(),
                },
            });
        };

        info!(
            installation_id = installation.id,
            account_login = %installation.account.login,
            "resolved installation"
        );
        Ok(installation.id)
    }
}

fn find_by_login(installations: Vec<Installation>, login: &str) -> Option<Installation> {
    installations
        .into_iter()
        .find(|inst| inst.account.login.eq_ignore_ascii_case(login))
}
