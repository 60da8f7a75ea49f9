use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    pub account: Account,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

/// `GET /repos/{owner}/{repo}/contents/{path}` for a single file.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    pub path: Option<String>,
    pub sha: Option<String>,
    #[serde(default)]
    pub size: u64,
    pub encoding: Option<String>,
    pub content: Option<String>,
}
