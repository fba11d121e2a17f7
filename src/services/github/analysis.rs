//! Repository Analysis Helpers
//!
//! Pure aggregation over fetched API data: language shares, keyword-based
//! technology detection and commit activity grouping.

use std::collections::HashMap;

use super::types::{Commit, LanguageBytes, Repository};

/// One language with its byte count and share of the total, in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percent: f64,
}

/// Top `limit` languages by bytes. Ties are broken by name.
pub fn language_shares(languages: &LanguageBytes, limit: usize) -> Vec<LanguageShare> {
    let total: u64 = languages.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut entries: Vec<(&String, &u64)> = languages.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(language, bytes)| LanguageShare {
            language: language.clone(),
            bytes: *bytes,
            percent: *bytes as f64 / total as f64 * 100.0,
        })
        .collect()
}

/// Add the byte counts of `from` into `into`.
pub fn merge_languages(into: &mut LanguageBytes, from: &LanguageBytes) {
    for (language, bytes) in from {
        *into.entry(language.clone()).or_insert(0) += bytes;
    }
}

const FRAMEWORK_KEYWORDS: &[(&str, &str)] = &[
    ("spring", "Spring Framework"),
    ("react", "React"),
    ("vue", "Vue.js"),
    ("angular", "Angular"),
    ("flutter", "Flutter"),
    ("kotlin", "Kotlin"),
    ("android", "Android"),
];

const DATABASE_KEYWORDS: &[(&str, &str)] = &[
    ("mysql", "MySQL"),
    ("postgresql", "PostgreSQL"),
    ("mongodb", "MongoDB"),
    ("redis", "Redis"),
    ("sqlite", "SQLite"),
];

const TOOL_KEYWORDS: &[(&str, &str)] = &[
    ("docker", "Docker"),
    ("kubernetes", "Kubernetes"),
    ("jenkins", "Jenkins"),
    ("git", "Git"),
    ("gradle", "Gradle"),
    ("maven", "Maven"),
];

/// Technologies guessed from repository names and descriptions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TechStack {
    pub frameworks: Vec<String>,
    pub databases: Vec<String>,
    pub tools: Vec<String>,
}

impl TechStack {
    /// Scan name and description of every repository, in first-seen order.
    pub fn detect<'a>(repositories: impl IntoIterator<Item = &'a Repository>) -> Self {
        let mut stack = TechStack::default();
        for repo in repositories {
            let text = format!(
                "{} {}",
                repo.name,
                repo.description.as_deref().unwrap_or("")
            )
            .to_lowercase();
            collect(&text, FRAMEWORK_KEYWORDS, &mut stack.frameworks);
            collect(&text, DATABASE_KEYWORDS, &mut stack.databases);
            collect(&text, TOOL_KEYWORDS, &mut stack.tools);
        }
        stack
    }
}

fn collect(text: &str, table: &[(&str, &str)], found: &mut Vec<String>) {
    for (keyword, label) in table {
        if text.contains(keyword) && !found.iter().any(|f| f == label) {
            found.push(label.to_string());
        }
    }
}

/// Commit counts per repository and per month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityStats {
    /// (repository, commits), most active first
    pub per_repository: Vec<(String, usize)>,
    /// (YYYY-MM, commits), busiest first
    pub per_month: Vec<(String, usize)>,
}

impl ActivityStats {
    pub fn from_commits(commits: &[(String, Vec<Commit>)]) -> Self {
        let mut months: HashMap<String, usize> = HashMap::new();
        let mut per_repository = Vec::with_capacity(commits.len());

        for (repo, list) in commits {
            per_repository.push((repo.clone(), list.len()));
            for commit in list {
                if let Some(month) = commit.commit.author.date.get(..7) {
                    *months.entry(month.to_string()).or_insert(0) += 1;
                }
            }
        }

        per_repository.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let mut per_month: Vec<(String, usize)> = months.into_iter().collect();
        per_month.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        Self {
            per_repository,
            per_month,
        }
    }

    pub fn total(&self) -> usize {
        self.per_repository.iter().map(|(_, n)| n).sum()
    }

    /// Most active repository and its share of all commits, in percent.
    pub fn most_active(&self) -> Option<(&str, f64)> {
        let total = self.total();
        let (name, count) = self.per_repository.first()?;
        if total == 0 {
            return None;
        }
        Some((name.as_str(), *count as f64 / total as f64 * 100.0))
    }
}

/// `YYYY-MM-DD` prefix of an ISO timestamp, or the input when shorter.
pub fn day(timestamp: &str) -> &str {
    timestamp.get(..10).unwrap_or(timestamp)
}
