//! GitHub toolset backed by the GitHub REST API.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs, ToolOutput};

const DEFAULT_API_URL: &str = "https://api.github.com";

/// File content longer than this is truncated before being handed to the model.
const MAX_CONTENT_CHARS: usize = 20_000;

/// Settings for the GitHub API client.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    /// Personal access token. Reads work without one, writes do not.
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(15),
        }
    }
}

impl GitHubConfig {
    /// Load from `GITHUB_API_URL` and `GITHUB_TOKEN`, both optional.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("GITHUB_API_URL") {
            if !url.trim().is_empty() {
                config.api_url = url.trim_end_matches('/').to_string();
            }
        }
        config.token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        config
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin client shared by the GitHub tools.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .user_agent("agent-router/0.1")
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn has_token(&self) -> bool {
        self.config.token.is_some()
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.api_url, path);
        debug!(%url, "github request");

        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/vnd.github+json");
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ToolError> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.message)
                .unwrap_or(body);
            return Err(ToolError::GitHub {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ToolError> {
        self.send(self.request(reqwest::Method::GET, path)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ToolError> {
        self.send(self.request(reqwest::Method::POST, path).json(body))
            .await
    }
}

/// Resolve `owner` and `repo`, accepting `repo` as `owner/name` when
/// `owner` is omitted.
fn repo_ref(args: &ToolArgs) -> Result<(String, String), ToolError> {
    let repo = args.get_string("repo")?;
    match args.get_string_opt("owner") {
        Some(owner) if !owner.is_empty() => Ok((owner, repo)),
        _ => match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => {
                Ok((owner.to_string(), name.to_string()))
            }
            _ => Err(ToolError::MissingParameter("owner".to_string())),
        },
    }
}

fn repo_schema(extra: Value, required: &[&str]) -> Value {
    let mut properties = json!({
        "owner": {"type": "string", "description": "Repository owner (user or organization)"},
        "repo": {"type": "string", "description": "Repository name, or owner/name"}
    });
    if let (Some(base), Some(extra)) = (properties.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
}

fn format_repositories(username: &str, repos: &[Repository]) -> String {
    if repos.is_empty() {
        return format!("No public repositories found for {}.", username);
    }

    let mut output = format!("Repositories for {} ({}):\n", username, repos.len());
    for repo in repos {
        output.push_str(&format!("- {}", repo.full_name));
        if let Some(language) = &repo.language {
            output.push_str(&format!(" [{}]", language));
        }
        output.push_str(&format!(" ★{}", repo.stargazers_count));
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            output.push_str(&format!(": {}", description));
        }
        output.push('\n');
    }
    output
}

/// Lists a user's public repositories.
///
/// # Parameters
///
/// - `username` (required): GitHub login
pub struct GetReposByUser {
    client: GitHubClient,
}

impl GetReposByUser {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetReposByUser {
    fn name(&self) -> &str {
        "get_repos_by_user"
    }

    fn description(&self) -> &str {
        "List the public repositories of a GitHub user."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "username": {"type": "string", "description": "GitHub username"}
            },
            "required": ["username"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let username = args.get_string("username")?;
        let repos: Vec<Repository> = self
            .client
            .get(&format!("/users/{}/repos?per_page=100&sort=updated", username))
            .await?;
        Ok(ToolOutput::success(format_repositories(&username, &repos)))
    }
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

fn format_entries(owner: &str, repo: &str, path: &str, entries: &[ContentEntry]) -> String {
    let location = if path.is_empty() {
        format!("{}/{}", owner, repo)
    } else {
        format!("{}/{}/{}", owner, repo, path)
    };
    if entries.is_empty() {
        return format!("{} is empty.", location);
    }

    let mut output = format!("Files in {} ({}):\n", location, entries.len());
    for entry in entries {
        let marker = if entry.kind == "dir" { "dir " } else { "file" };
        output.push_str(&format!("- [{}] {}\n", marker, entry.path));
    }
    output
}

/// Lists the files at a path of a repository.
///
/// # Parameters
///
/// - `owner`, `repo` (required): Repository
/// - `path` (optional): Directory inside the repository, default is the root
pub struct GetFilesByRepo {
    client: GitHubClient,
}

impl GetFilesByRepo {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetFilesByRepo {
    fn name(&self) -> &str {
        "get_files_by_repo"
    }

    fn description(&self) -> &str {
        "List files and directories in a GitHub repository, optionally under a path."
    }

    fn parameters(&self) -> Value {
        repo_schema(
            json!({"path": {"type": "string", "description": "Directory path, empty for the root"}}),
            &["repo"],
        )
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let (owner, repo) = repo_ref(&args)?;
        let path = args
            .get_string_opt("path")
            .unwrap_or_default()
            .trim_matches('/')
            .to_string();

        let entries: Vec<ContentEntry> = self
            .client
            .get(&format!("/repos/{}/{}/contents/{}", owner, repo, path))
            .await?;
        Ok(ToolOutput::success(format_entries(
            &owner, &repo, &path, &entries,
        )))
    }
}

#[derive(Debug, Deserialize)]
struct FileContent {
    path: String,
    content: Option<String>,
    encoding: Option<String>,
}

fn decode_content(file: &FileContent) -> Result<String, ToolError> {
    let raw = file
        .content
        .as_deref()
        .ok_or_else(|| ToolError::Failed(format!("{} is not a file", file.path)))?;

    if file.encoding.as_deref() != Some("base64") {
        return Ok(raw.to_string());
    }

    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| ToolError::Failed(format!("invalid base64 content: {}", e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn truncate(content: &str) -> String {
    match content.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => format!("{}\n... (truncated)", &content[..cut]),
        None => content.to_string(),
    }
}

/// Fetches the content of a file in a repository.
///
/// # Parameters
///
/// - `owner`, `repo` (required): Repository
/// - `path` (required): File path
pub struct GetFileContent {
    client: GitHubClient,
}

impl GetFileContent {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetFileContent {
    fn name(&self) -> &str {
        "get_file_content"
    }

    fn description(&self) -> &str {
        "Get the content of a file in a GitHub repository."
    }

    fn parameters(&self) -> Value {
        repo_schema(
            json!({"path": {"type": "string", "description": "Path of the file"}}),
            &["repo", "path"],
        )
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        let (owner, repo) = repo_ref(&args)?;
        let path = args.get_string("path")?;

        let file: FileContent = self
            .client
            .get(&format!(
                "/repos/{}/{}/contents/{}",
                owner,
                repo,
                path.trim_start_matches('/')
            ))
            .await?;
        let content = decode_content(&file)?;

        Ok(ToolOutput::success(format!(
            "Content of {}/{}/{}:\n```\n{}\n```",
            owner,
            repo,
            file.path,
            truncate(&content)
        )))
    }
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    number: u64,
    html_url: String,
}

/// Opens an issue in a repository. Requires `GITHUB_TOKEN`.
///
/// # Parameters
///
/// - `owner`, `repo` (required): Repository
/// - `title` (required): Issue title
/// - `body` (optional): Issue description
pub struct CreateGithubIssue {
    client: GitHubClient,
}

impl CreateGithubIssue {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CreateGithubIssue {
    fn name(&self) -> &str {
        "create_github_issue"
    }

    fn description(&self) -> &str {
        "Create an issue in a GitHub repository."
    }

    fn parameters(&self) -> Value {
        repo_schema(
            json!({
                "title": {"type": "string", "description": "Issue title"},
                "body": {"type": "string", "description": "Issue description"}
            }),
            &["repo", "title"],
        )
    }

    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError> {
        if !self.client.has_token() {
            return Err(ToolError::Failed(
                "GITHUB_TOKEN is required to create issues".to_string(),
            ));
        }

        let (owner, repo) = repo_ref(&args)?;
        let title = args.get_string("title")?;
        let body = args.get_string_opt("body").unwrap_or_default();

        let issue: CreatedIssue = self
            .client
            .post(
                &format!("/repos/{}/{}/issues", owner, repo),
                &NewIssue {
                    title: &title,
                    body: &body,
                },
            )
            .await?;

        Ok(ToolOutput::success(format!(
            "Created issue #{} in {}/{}: {}",
            issue.number, owner, repo, issue.html_url
        )))
    }
}
