//! GitHub Operation Handlers
//!
//! One `OperationHandler` per operation the classifier can name. Primary
//! lookups propagate their `DispatchError`; secondary lookups (languages,
//! contents, commits, contributors) degrade to empty data.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use mentor_core::error::{DispatchError, DispatchResult};
use mentor_core::operation::OperationHandler;
use mentor_core::request::OperationParams;

use super::analysis::{day, language_shares, merge_languages, ActivityStats, TechStack};
use super::client::GitHubClient;
use super::types::{
    Commit, ContentEntry, Contributor, CreateRepositoryRequest, LanguageBytes, Repository,
};

const RULE_WIDE: usize = 60;
const README_PREVIEW_CHARS: usize = 200;

fn or_empty<T: Default>(result: DispatchResult<T>, what: &str, repo: &str) -> T {
    result.unwrap_or_else(|e| {
        warn!(repo, lookup = what, error = %e, "secondary lookup failed, using empty result");
        T::default()
    })
}

fn required_name<'a>(params: &OperationParams<'a>) -> DispatchResult<&'a str> {
    params
        .repository_name()
        .ok_or_else(|| DispatchError::missing_parameter("name"))
}

/// Languages, contents and commits of one repository, fetched concurrently.
async fn secondary_lookups(
    client: &GitHubClient,
    owner: &str,
    repo: &str,
) -> (LanguageBytes, Vec<ContentEntry>, Vec<Commit>) {
    let (languages, contents, commits) = futures_util::join!(
        client.languages(owner, repo),
        client.contents(owner, repo),
        client.commits(owner, repo),
    );
    (
        or_empty(languages, "languages", repo),
        or_empty(contents, "contents", repo),
        or_empty(commits, "commits", repo),
    )
}

/// Languages of each repository, fetched concurrently. Failures count as empty.
async fn languages_of(client: &GitHubClient, owner: &str, repos: &[Repository]) -> LanguageBytes {
    let results = join_all(repos.iter().map(|repo| client.languages(owner, &repo.name))).await;
    let mut total = LanguageBytes::new();
    for (repo, result) in repos.iter().zip(results) {
        merge_languages(&mut total, &or_empty(result, "languages", &repo.name));
    }
    total
}

fn push_repository_card(out: &mut String, repo: &Repository, title: &str, topic_limit: usize) {
    out.push_str(&format!("🔹 **{}**\n", title));
    out.push_str(&format!("   📝 {}\n", repo.description_or("No description")));
    out.push_str(&format!("   🌐 {}\n", repo.html_url));
    out.push_str(&format!(
        "   ⭐ {} stars | 🔀 {} forks\n",
        repo.stargazers_count, repo.forks_count
    ));
    out.push_str(&format!("   📁 {} | 📦 {} KB\n", repo.language_or("Unknown"), repo.size));
    out.push_str(&format!("   📅 Created: {}\n", repo.created_at));
    out.push_str(&format!("   🔄 Updated: {}\n", repo.updated_at));
    if !repo.topics.is_empty() {
        let topics: Vec<&str> = repo.topics.iter().take(topic_limit).map(String::as_str).collect();
        out.push_str(&format!("   🏷️ Topics: {}\n", topics.join(", ")));
    }
}

// ============================================================================
// Simple operations
// ============================================================================

pub struct CreateRepository {
    client: Arc<GitHubClient>,
}

impl CreateRepository {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for CreateRepository {
    fn name(&self) -> &str {
        "create_repository"
    }

    fn description(&self) -> &str {
        "create a new repository"
    }

    fn parameter_hints(&self) -> Vec<&'static str> {
        vec!["name", "description"]
    }

    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
        let name = required_name(&params)?;
        let request = CreateRepositoryRequest::public(name, params.get_or_empty("description"));
        debug!(name, "creating repository");
        let repo = self.client.create_repository(&request).await?;
        Ok(format!(
            "✅ Repository '{}' created successfully: {}",
            name, repo.html_url
        ))
    }
}

pub struct ListRepositories {
    client: Arc<GitHubClient>,
}

impl ListRepositories {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for ListRepositories {
    fn name(&self) -> &str {
        "list_repositories"
    }

    fn description(&self) -> &str {
        "list the user's repositories"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let repos = self.client.list_repositories().await?;
        let mut out = format!("📋 Found {} repositories:", repos.len());
        for repo in repos.iter().take(5) {
            out.push_str(&format!("\n• {} - {}", repo.name, repo.description_or("no description")));
        }
        Ok(out)
    }
}

pub struct SearchCode {
    client: Arc<GitHubClient>,
}

impl SearchCode {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for SearchCode {
    fn name(&self) -> &str {
        "search_code"
    }

    fn description(&self) -> &str {
        "search code and repositories by keywords"
    }

    fn parameter_hints(&self) -> Vec<&'static str> {
        vec!["query"]
    }

    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
        let query = params.get_or_empty("query");
        let result = self.client.search_repositories(query).await?;
        let mut out = format!(
            "🔍 Search for '{}': found {} repositories",
            query, result.total_count
        );
        for repo in result.items.iter().take(3) {
            out.push_str(&format!("\n• {} - {}", repo.full_name, repo.description_or("no description")));
        }
        Ok(out)
    }
}

pub struct SearchRepositories {
    client: Arc<GitHubClient>,
}

impl SearchRepositories {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for SearchRepositories {
    fn name(&self) -> &str {
        "search_repositories"
    }

    fn description(&self) -> &str {
        "search repositories with detailed results"
    }

    fn parameter_hints(&self) -> Vec<&'static str> {
        vec!["query"]
    }

    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
        let query = params
            .get("query")
            .ok_or_else(|| DispatchError::missing_parameter("query"))?;
        let result = self.client.search_repositories(query).await?;
        if result.items.is_empty() {
            return Ok(format!("🔍 Nothing found for '{}'", query));
        }

        let mut out = String::new();
        out.push_str(&format!("🔍 Repository search results for '{}':\n", query));
        out.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDE)));
        for repo in result.items.iter().take(10) {
            push_repository_card(&mut out, repo, &repo.full_name, 3);
            out.push('\n');
        }
        if result.items.len() > 10 {
            out.push_str(&format!("... and {} more results\n", result.items.len() - 10));
        }
        Ok(out)
    }
}

pub struct ListAllRepositories {
    client: Arc<GitHubClient>,
}

impl ListAllRepositories {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for ListAllRepositories {
    fn name(&self) -> &str {
        "list_all_repositories"
    }

    fn description(&self) -> &str {
        "list every repository with details"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let repos = self.client.list_all_repositories().await?;
        if repos.is_empty() {
            return Ok("📚 You have no repositories yet".to_string());
        }

        let mut out = String::new();
        out.push_str(&format!("📚 Detailed information about all repositories ({}):\n", repos.len()));
        out.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDE)));
        for repo in &repos {
            push_repository_card(&mut out, repo, &repo.name, 5);
            if repo.has_wiki {
                out.push_str("   📚 Wiki\n");
            }
            if repo.has_pages {
                out.push_str("   🌐 Pages\n");
            }
            if let Some(license) = &repo.license {
                out.push_str(&format!("   📄 License: {}\n", license.name));
            }
            out.push_str(&format!("\n{}\n\n", "-".repeat(40)));
        }
        Ok(out)
    }
}

// ============================================================================
// Profile and repository analysis
// ============================================================================

pub struct AnalyzeProfile {
    client: Arc<GitHubClient>,
}

impl AnalyzeProfile {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for AnalyzeProfile {
    fn name(&self) -> &str {
        "analyze_profile"
    }

    fn description(&self) -> &str {
        "analyze the user's GitHub profile"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let profile = self.client.user_profile().await?;
        let repos = self.client.list_all_repositories().await?;
        let stars: u64 = repos.iter().map(|r| r.stargazers_count).sum();
        let forks: u64 = repos.iter().map(|r| r.forks_count).sum();

        let mut out = String::new();
        out.push_str(&format!("👤 **GitHub profile analysis: {}**\n\n", profile.display_name()));
        out.push_str("📊 **Main statistics:**\n");
        out.push_str(&format!("• Repositories: {}\n", profile.public_repos));
        out.push_str(&format!("• Followers: {}\n", profile.followers));
        out.push_str(&format!("• Following: {}\n", profile.following));
        out.push_str(&format!("• Gists: {}\n", profile.public_gists));
        out.push_str(&format!("• Member since: {}\n\n", day(&profile.created_at)));
        out.push_str("⭐ **Activity:**\n");
        out.push_str(&format!("• Total stars: {}\n", stars));
        out.push_str(&format!("• Total forks: {}\n", forks));
        let last_update = repos.first().map(|r| day(&r.updated_at)).unwrap_or("N/A");
        out.push_str(&format!("• Last update: {}\n\n", last_update));
        if let Some(bio) = &profile.bio {
            out.push_str(&format!("📝 **About:** {}\n\n", bio));
        }
        if let Some(company) = &profile.company {
            out.push_str(&format!("🏢 **Company:** {}\n\n", company));
        }
        if let Some(location) = &profile.location {
            out.push_str(&format!("📍 **Location:** {}\n", location));
        }
        Ok(out)
    }
}

pub struct AnalyzeRepository {
    client: Arc<GitHubClient>,
}

impl AnalyzeRepository {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for AnalyzeRepository {
    fn name(&self) -> &str {
        "analyze_repository"
    }

    fn description(&self) -> &str {
        "analyze one repository: languages, structure, README and commits"
    }

    fn parameter_hints(&self) -> Vec<&'static str> {
        vec!["name"]
    }

    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
        let name = required_name(&params)?;
        let profile = self.client.user_profile().await?;
        let repo = self.client.repository(&profile.login, name).await?;
        let (languages, contents, commits) =
            secondary_lookups(&self.client, &profile.login, name).await;

        let mut out = String::new();
        out.push_str(&format!("📚 **Repository analysis: {}**\n\n", name));
        out.push_str("📊 **Main information:**\n");
        out.push_str(&format!("• Description: {}\n", repo.description_or("no description")));
        out.push_str(&format!("• Size: {} KB\n", repo.size));
        out.push_str(&format!("• Primary language: {}\n", repo.language_or("unknown")));
        out.push_str(&format!("• Private: {}\n", if repo.private { "Yes" } else { "No" }));
        out.push_str(&format!("• Created: {}\n", day(&repo.created_at)));
        out.push_str(&format!("• Updated: {}\n\n", day(&repo.updated_at)));
        out.push_str("⭐ **Statistics:**\n");
        out.push_str(&format!("• Stars: {}\n", repo.stargazers_count));
        out.push_str(&format!("• Forks: {}\n", repo.forks_count));
        out.push_str(&format!("• Watchers: {}\n", repo.watchers_count));
        out.push_str(&format!("• Open issues: {}\n\n", repo.open_issues_count));

        out.push_str("🔧 **Technologies:**\n");
        let shares = language_shares(&languages, 5);
        if shares.is_empty() {
            out.push_str("• Languages not detected\n");
        }
        for share in shares {
            out.push_str(&format!("• {}: {:.1}%\n", share.language, share.percent));
        }

        let directories: Vec<&str> = contents
            .iter()
            .filter(|c| c.is_dir())
            .map(|c| c.name.as_str())
            .collect();
        out.push_str("\n📁 **Structure:**\n");
        out.push_str(&format!("• Total files: {}\n", contents.len()));
        out.push_str(&format!("• Directories: {}\n\n", directories.join(", ")));

        out.push_str("📝 **README:**\n");
        match contents.iter().find(|c| c.is_readme()) {
            Some(readme) => {
                let preview: String = readme
                    .content
                    .as_deref()
                    .map(|c| c.chars().take(README_PREVIEW_CHARS).collect())
                    .unwrap_or_else(|| "Content unavailable".to_string());
                out.push_str(&format!("{}...\n", preview));
            }
            None => out.push_str("README not found\n"),
        }

        out.push_str("\n🔄 **Activity:**\n");
        let last_commit = commits
            .first()
            .map(|c| day(&c.commit.author.date))
            .unwrap_or("N/A");
        out.push_str(&format!("• Last commit: {}\n", last_commit));
        out.push_str(&format!("• Total commits: {}\n", commits.len()));
        Ok(out)
    }
}

pub struct RepositoryDetails {
    client: Arc<GitHubClient>,
}

impl RepositoryDetails {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for RepositoryDetails {
    fn name(&self) -> &str {
        "repository_details"
    }

    fn description(&self) -> &str {
        "detailed information about one repository"
    }

    fn parameter_hints(&self) -> Vec<&'static str> {
        vec!["name"]
    }

    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
        let name = required_name(&params)?;
        let profile = self.client.user_profile().await?;
        let owner = profile.login.as_str();
        let repo = self.client.repository(owner, name).await?;
        let ((languages, contents, commits), contributors) = futures_util::join!(
            secondary_lookups(&self.client, owner, name),
            self.client.contributors(owner, name),
        );
        let contributors: Vec<Contributor> = or_empty(contributors, "contributors", name);

        let mut out = String::new();
        out.push_str(&format!("🔍 **Repository details: {}**\n", repo.name));
        out.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDE)));
        out.push_str(&format!("📝 **Description:** {}\n", repo.description_or("No description")));
        out.push_str(&format!("🌐 **URL:** {}\n", repo.html_url));
        let visibility = if repo.private { "Private" } else { "Public" };
        out.push_str(&format!("🔒 **Visibility:** {}\n\n", visibility));

        out.push_str("📊 **Statistics:**\n");
        out.push_str(&format!("   ⭐ Stars: {}\n", repo.stargazers_count));
        out.push_str(&format!("   🔀 Forks: {}\n", repo.forks_count));
        out.push_str(&format!("   📝 Open issues: {}\n", repo.open_issues_count));
        out.push_str(&format!("   📦 Size: {} KB\n\n", repo.size));

        out.push_str("🔧 **Technologies:**\n");
        out.push_str(&format!("   📁 Primary language: {}\n", repo.language_or("Unknown")));
        let shares = language_shares(&languages, usize::MAX);
        if !shares.is_empty() {
            out.push_str("   📊 Languages:\n");
            for share in shares {
                out.push_str(&format!("      • {}: {:.1}%\n", share.language, share.percent));
            }
        }

        let dirs: Vec<&str> = contents.iter().filter(|c| c.is_dir()).map(|c| c.name.as_str()).collect();
        let main_files: Vec<&str> = contents
            .iter()
            .filter(|c| c.is_file() && !c.is_readme())
            .take(5)
            .map(|c| c.name.as_str())
            .collect();
        let config_files: Vec<&str> = contents
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| {
                let lower = n.to_lowercase();
                ["gradle", "build", "pom", "package", "cargo"]
                    .iter()
                    .any(|k| lower.contains(k))
            })
            .collect();
        out.push_str("\n📁 **Structure:**\n");
        out.push_str(&format!("   📂 Directories: {}\n", dirs.join(", ")));
        out.push_str(&format!("   📄 Main files: {}\n", main_files.join(", ")));
        out.push_str(&format!("   ⚙️ Configuration files: {}\n\n", config_files.join(", ")));

        out.push_str("💾 **Commits:**\n");
        out.push_str(&format!("   📊 Total commits: {}\n", commits.len()));
        if let Some(last) = commits.first() {
            out.push_str(&format!("   🔄 Last commit: {}\n", last.commit.author.date));
            let mut authors: Vec<&str> = Vec::new();
            for commit in commits.iter().take(5) {
                let author = commit.commit.author.name.as_str();
                if !author.is_empty() && !authors.contains(&author) {
                    authors.push(author);
                }
            }
            out.push_str(&format!("   👤 Authors: {}\n", authors.join(", ")));
        }
        if !contributors.is_empty() {
            let mut ranked: Vec<&Contributor> = contributors.iter().collect();
            ranked.sort_by(|a, b| b.total.cmp(&a.total));
            let top: Vec<String> = ranked
                .iter()
                .take(5)
                .filter_map(|c| c.author.as_ref().map(|a| format!("{} ({})", a.login, c.total)))
                .collect();
            out.push_str(&format!("   👥 Top contributors: {}\n", top.join(", ")));
        }
        out.push('\n');

        if !repo.topics.is_empty() {
            out.push_str(&format!("🏷️ **Topics:** {}\n", repo.topics.join(", ")));
        }
        if let Some(license) = &repo.license {
            out.push_str(&format!("📄 **License:** {}\n", license.name));
        }
        if repo.has_wiki {
            out.push_str("📚 **Wiki:** Yes\n");
        }
        if repo.has_pages {
            out.push_str("🌐 **Pages:** Yes\n");
        }
        Ok(out)
    }
}

// ============================================================================
// Aggregate reports
// ============================================================================

pub struct GenerateReport {
    client: Arc<GitHubClient>,
}

impl GenerateReport {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for GenerateReport {
    fn name(&self) -> &str {
        "generate_report"
    }

    fn description(&self) -> &str {
        "generate a full report on the user's GitHub profile"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let profile = self.client.user_profile().await?;
        let repos = self.client.list_all_repositories().await?;
        let sample = &repos[..repos.len().min(10)];
        let languages = languages_of(&self.client, &profile.login, sample).await;
        let stars: u64 = repos.iter().map(|r| r.stargazers_count).sum();
        let forks: u64 = repos.iter().map(|r| r.forks_count).sum();

        let mut out = String::new();
        out.push_str("📊 **FULL GITHUB PROFILE REPORT**\n");
        out.push_str(&format!("{}\n\n", "=".repeat(50)));
        out.push_str("👤 **PROFILE:**\n");
        out.push_str(&format!("• Name: {}\n", profile.display_name()));
        out.push_str(&format!("• Login: {}\n", profile.login));
        out.push_str(&format!("• Bio: {}\n", profile.bio.as_deref().unwrap_or("not specified")));
        out.push_str(&format!("• Company: {}\n", profile.company.as_deref().unwrap_or("not specified")));
        out.push_str(&format!("• Location: {}\n", profile.location.as_deref().unwrap_or("not specified")));
        out.push_str(&format!("• Member since: {}\n\n", day(&profile.created_at)));

        out.push_str("📈 **OVERALL STATISTICS:**\n");
        out.push_str(&format!("• Public repositories: {}\n", profile.public_repos));
        out.push_str(&format!("• Gists: {}\n", profile.public_gists));
        out.push_str(&format!("• Followers: {}\n", profile.followers));
        out.push_str(&format!("• Following: {}\n", profile.following));
        out.push_str(&format!("• Total stars: {}\n", stars));
        out.push_str(&format!("• Total forks: {}\n\n", forks));

        out.push_str("🔧 **TECHNOLOGY STACK:**\n");
        let shares = language_shares(&languages, 5);
        if shares.is_empty() {
            out.push_str("Programming languages not detected\n");
        } else {
            out.push_str("Top programming languages:\n");
            for share in shares {
                out.push_str(&format!("  • {}: {:.1}%\n", share.language, share.percent));
            }
        }

        out.push_str("\n📚 **REPOSITORIES (top 10):**\n");
        for (i, repo) in repos.iter().take(10).enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, repo.name));
            out.push_str(&format!("   • {}\n", repo.description_or("no description")));
            out.push_str(&format!("   • ⭐ {} | 🔀 {}\n", repo.stargazers_count, repo.forks_count));
            out.push_str(&format!("   • Primary language: {}\n", repo.language_or("unknown")));
            out.push_str(&format!("   • Updated: {}\n\n", day(&repo.updated_at)));
        }
        out.push_str(&format!("{}\n", "=".repeat(50)));
        out.push_str(&format!(
            "📅 Report generated: {}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        Ok(out)
    }
}

pub struct GetTechnologyStack {
    client: Arc<GitHubClient>,
}

impl GetTechnologyStack {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for GetTechnologyStack {
    fn name(&self) -> &str {
        "get_technology_stack"
    }

    fn description(&self) -> &str {
        "analyze languages, frameworks, databases and tools across repositories"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let profile = self.client.user_profile().await?;
        let repos = self.client.list_all_repositories().await?;
        let sample = &repos[..repos.len().min(15)];
        let languages = languages_of(&self.client, &profile.login, sample).await;
        let stack = TechStack::detect(sample);

        let mut out = String::new();
        out.push_str("🔧 **TECHNOLOGY STACK ANALYSIS**\n");
        out.push_str(&format!("{}\n\n", "=".repeat(40)));

        out.push_str("💻 **PROGRAMMING LANGUAGES:**\n");
        let shares = language_shares(&languages, 8);
        if shares.is_empty() {
            out.push_str("Languages not detected\n");
        }
        for share in shares {
            out.push_str(&format!(
                "• {}: {:.1}% ({} bytes)\n",
                share.language, share.percent, share.bytes
            ));
        }

        push_detected(&mut out, "⚡ **FRAMEWORKS:**", &stack.frameworks, "Frameworks not detected");
        push_detected(&mut out, "🗄️ **DATABASES:**", &stack.databases, "Databases not detected");
        push_detected(&mut out, "🛠️ **TOOLS:**", &stack.tools, "Tools not detected");

        out.push_str("\n📊 **STATISTICS:**\n");
        out.push_str(&format!("• Repositories analyzed: {}\n", sample.len()));
        out.push_str(&format!("• Languages found: {}\n", languages.len()));
        out.push_str(&format!("• Frameworks found: {}\n", stack.frameworks.len()));
        out.push_str(&format!("• Databases found: {}\n", stack.databases.len()));
        out.push_str(&format!("• Tools found: {}\n", stack.tools.len()));
        Ok(out)
    }
}

fn push_detected(out: &mut String, heading: &str, items: &[String], empty: &str) {
    out.push_str(&format!("\n{}\n", heading));
    if items.is_empty() {
        out.push_str(&format!("{}\n", empty));
    }
    for item in items {
        out.push_str(&format!("• {}\n", item));
    }
}

pub struct GetActivityStats {
    client: Arc<GitHubClient>,
}

impl GetActivityStats {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OperationHandler for GetActivityStats {
    fn name(&self) -> &str {
        "get_activity_stats"
    }

    fn description(&self) -> &str {
        "commit activity statistics by month and repository"
    }

    async fn execute(&self, _params: OperationParams<'_>) -> DispatchResult<String> {
        let profile = self.client.user_profile().await?;
        let repos = self.client.list_all_repositories().await?;
        let sample = &repos[..repos.len().min(10)];
        let results = join_all(
            sample
                .iter()
                .map(|repo| self.client.commits(&profile.login, &repo.name)),
        )
        .await;

        // Repositories whose commits could not be read are left out
        let commits: Vec<(String, Vec<Commit>)> = sample
            .iter()
            .zip(results)
            .filter_map(|(repo, result)| match result {
                Ok(list) => Some((repo.name.clone(), list)),
                Err(e) => {
                    warn!(repo = %repo.name, error = %e, "commits unavailable");
                    None
                }
            })
            .collect();
        let stats = ActivityStats::from_commits(&commits);
        let total = stats.total();

        let mut out = String::new();
        out.push_str("📈 **ACTIVITY STATISTICS**\n");
        out.push_str(&format!("{}\n\n", "=".repeat(35)));
        out.push_str("🔄 **OVERALL ACTIVITY:**\n");
        out.push_str(&format!("• Total commits: {}\n", total));
        out.push_str(&format!("• Repositories analyzed: {}\n", stats.per_repository.len()));
        let most_active = stats.most_active().map(|(name, _)| name).unwrap_or("N/A");
        out.push_str(&format!("• Most active repository: {}\n\n", most_active));

        out.push_str("📅 **ACTIVITY BY MONTH:**\n");
        if stats.per_month.is_empty() {
            out.push_str("Monthly data unavailable\n");
        }
        for (month, count) in stats.per_month.iter().take(6) {
            out.push_str(&format!("• {}: {} commits\n", month, count));
        }

        out.push_str("\n📊 **ACTIVITY BY REPOSITORY:**\n");
        for (repo, count) in stats.per_repository.iter().take(5) {
            out.push_str(&format!("• {}: {} commits\n", repo, count));
        }

        out.push_str("\n💡 **INSIGHTS:**\n");
        if total > 0 {
            let average = total as f64 / stats.per_repository.len() as f64;
            out.push_str(&format!("• Average commits per repository: {:.1}\n", average));
            if let Some((name, share)) = stats.most_active() {
                out.push_str(&format!("• {} accounts for {:.1}% of all activity\n", name, share));
            }
        }
        Ok(out)
    }
}
