//! GitHub REST Client
//!
//! Thin typed wrapper over the REST endpoints the operation handlers use.
//! Every failure is a `DispatchError` so handlers can propagate with `?`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use mentor_core::error::{DispatchError, DispatchResult};
use mentor_llm::{build_http_client, HttpClientConfig};

use crate::models::settings::GitHubSettings;
use crate::utils::error::AppResult;

use super::types::{
    Commit, ContentEntry, Contributor, CreateRepositoryRequest, LanguageBytes, Repository,
    SearchResponse, UserProfile,
};

const ACCEPT: &str = "application/vnd.github+json";

pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    user_agent: String,
    per_page: u32,
    per_page_all: u32,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings, http: &HttpClientConfig) -> AppResult<Self> {
        Ok(Self::with_client(build_http_client(http)?, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: &GitHubSettings) -> Self {
        Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            token: settings
                .token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            user_agent: settings.user_agent.clone(),
            per_page: settings.per_page,
            per_page_all: settings.per_page_all,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header("Accept", ACCEPT)
            .header("User-Agent", &self.user_agent);
        if let Some(token) = &self.token {
            builder = builder.header("Authorization", format!("token {}", token));
        }
        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder, path: &str) -> DispatchResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| DispatchError::transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DispatchError::transport(format!("failed to read response body: {}", e)))?;
        debug!(path, status, bytes = body.len(), "github response");

        if !(200..300).contains(&status) {
            return Err(DispatchError::from_status(status, &api_message(&body)));
        }
        serde_json::from_str(&body).map_err(|e| DispatchError::decode(format!("{}: {}", path, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> DispatchResult<T> {
        self.send(self.request(reqwest::Method::GET, path), path).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> DispatchResult<T> {
        self.send(self.request(reqwest::Method::POST, path).json(body), path)
            .await
    }

    /// Recently updated repositories of the authenticated user.
    pub async fn list_repositories(&self) -> DispatchResult<Vec<Repository>> {
        self.get(&format!(
            "user/repos?per_page={}&sort=updated&direction=desc",
            self.per_page
        ))
        .await
    }

    /// Up to `per_page_all` repositories of the authenticated user.
    pub async fn list_all_repositories(&self) -> DispatchResult<Vec<Repository>> {
        self.get(&format!(
            "user/repos?per_page={}&sort=updated&direction=desc",
            self.per_page_all
        ))
        .await
    }

    pub async fn create_repository(&self, request: &CreateRepositoryRequest) -> DispatchResult<Repository> {
        self.post("user/repos", request).await
    }

    pub async fn search_repositories(&self, query: &str) -> DispatchResult<SearchResponse> {
        self.get(&format!(
            "search/repositories?q={}&per_page={}",
            urlencoding::encode(query),
            self.per_page
        ))
        .await
    }

    pub async fn user_profile(&self) -> DispatchResult<UserProfile> {
        self.get("user").await
    }

    pub async fn repository(&self, owner: &str, repo: &str) -> DispatchResult<Repository> {
        self.get(&repo_path(owner, repo, "")).await
    }

    pub async fn languages(&self, owner: &str, repo: &str) -> DispatchResult<LanguageBytes> {
        self.get(&repo_path(owner, repo, "/languages")).await
    }

    pub async fn contents(&self, owner: &str, repo: &str) -> DispatchResult<Vec<ContentEntry>> {
        self.get(&repo_path(owner, repo, "/contents")).await
    }

    pub async fn commits(&self, owner: &str, repo: &str) -> DispatchResult<Vec<Commit>> {
        self.get(&format!(
            "{}?per_page={}",
            repo_path(owner, repo, "/commits"),
            self.per_page
        ))
        .await
    }

    pub async fn contributors(&self, owner: &str, repo: &str) -> DispatchResult<Vec<Contributor>> {
        self.get(&repo_path(owner, repo, "/stats/contributors")).await
    }
}

fn repo_path(owner: &str, repo: &str, suffix: &str) -> String {
    format!(
        "repos/{}/{}{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        suffix
    )
}

/// The API's `message` field when the body is a JSON error, else the body.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}
