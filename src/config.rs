use std::fmt;
use std::str::FromStr;

use jsonwebtoken::EncodingKey;

use crate::error::FetchError;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_TARGET_PATH: &str = "data.json";
pub const DEFAULT_QUERY_PATH: &str = "jellyfish.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallationLookup {
    /// `GET /repos/{owner}/{repo}/installation`
    #[default]
    Repository,
    /// `GET /app/installations`, matched on the account login
    Account,
}

impl FromStr for InstallationLookup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repository" | "repo" => Ok(Self::Repository),
            "account" | "installations" => Ok(Self::Account),
            other => Err(format!(
                "GITHUB_INSTALLATION_LOOKUP must be `repository` or `account`, got `{other}`"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// `None` unless both names use GitHub's `[A-Za-z0-9._-]`.
    pub fn parse(owner: &str, repo: &str) -> Option<Self> {
        (is_valid_name(owner) && is_valid_name(repo)).then(|| Self::new(owner, repo))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Clone)]
pub struct Settings {
    pub github_app_id: Option<String>,
    pub github_client_id: Option<String>,
    pub github_private_key: Option<String>,
    pub github_api_url: String,
    pub installation_lookup: InstallationLookup,
    pub target: Option<RepoTarget>,
    pub target_path: String,
    pub query_path: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(var: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let installation_lookup = match non_empty("GITHUB_INSTALLATION_LOOKUP") {
            Some(value) => value.parse()?,
            None => InstallationLookup::default(),
        };

        let target = match (non_empty("GITHUB_TARGET_OWNER"), non_empty("GITHUB_TARGET_REPO")) {
            (Some(owner), Some(repo)) => {
                let target = RepoTarget::parse(&owner, &repo)
                    .ok_or_else(|| format!("invalid GITHUB_TARGET repository `{owner}/{repo}`"))?;
                Some(target)
            }
            (None, None) => None,
            _ => {
                return Err(String::from(
                    "GITHUB_TARGET_OWNER and GITHUB_TARGET_REPO must be set together",
                ));
            }
        };

        Ok(Self {
            github_app_id: non_empty("GITHUB_APP_ID"),
            github_client_id: non_empty("GITHUB_CLIENT_ID"),
            github_private_key: non_empty("GITHUB_PRIVATE_KEY"),
            github_api_url: non_empty("GITHUB_API_URL")
                .unwrap_or_else(|| String::from(DEFAULT_API_URL)),
            installation_lookup,
            target,
            target_path: non_empty("GITHUB_TARGET_PATH")
                .unwrap_or_else(|| String::from(DEFAULT_TARGET_PATH)),
            query_path: non_empty("GITHUB_QUERY_PATH")
                .unwrap_or_else(|| String::from(DEFAULT_QUERY_PATH)),
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("github_app_id", &self.github_app_id)
            .field("github_client_id", &self.github_client_id)
            .field(
                "github_private_key",
                &self.github_private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("github_api_url", &self.github_api_url)
            .field("installation_lookup", &self.installation_lookup)
            .field("target", &self.target)
            .field("target_path", &self.target_path)
            .field("query_path", &self.query_path)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppCredentials {
    pub app_id: String,
    pub encoding_key: EncodingKey,
}

impl AppCredentials {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        let app_id = settings
            .github_app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FetchError::Config(String::from("GITHUB_APP_ID must be set")))?;
        let private_key = settings
            .github_private_key
            .as_deref()
            .ok_or_else(|| FetchError::Config(String::from("GITHUB_PRIVATE_KEY must be set")))?;

        let encoding_key = EncodingKey::from_rsa_pem(normalize_private_key(private_key).as_bytes())
            .map_err(|e| {
                FetchError::Config(format!("GITHUB_PRIVATE_KEY is not a valid RSA PEM: {e}"))
            })?;

        Ok(Self {
            app_id: app_id.to_string(),
            encoding_key,
        })
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

pub fn normalize_private_key(raw: &str) -> String {
    raw.trim().replace("\\n", "\n")
}
