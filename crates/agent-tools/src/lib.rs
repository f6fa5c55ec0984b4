//! Tool registry and toolsets for the specialist agents.
//!
//! Each specialist is a model bound to a fixed toolset. This crate provides
//! the [`Tool`] trait, a [`ToolRegistry`] to hold a toolset, and the
//! [`RegistryToolExecutor`] adapter that exposes a registry to a brain as a
//! `brain_core::ToolExecutor`.
//!
//! # Toolsets
//!
//! ## Math
//! - [`Arithmetic`] - `add`, `subtract`, `multiply`, `divide`, `power`, `modulo`
//! - [`EvaluateExpression`] - Safe expression evaluation using `meval`
//!
//! ## GitHub
//! - [`GetReposByUser`] - List a user's public repositories
//! - [`GetFilesByRepo`] - List files at a path of a repository
//! - [`GetFileContent`] - Fetch a file's decoded content
//! - [`CreateGithubIssue`] - Open an issue (requires a token)
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::math_registry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = math_registry();
//!     let result = registry
//!         .execute_json("evaluate_expression", r#"{"expression": "(2 + 3) * 4"}"#)
//!         .await
//!         .unwrap();
//!     println!("{}", result.content); // "(2 + 3) * 4 = 20"
//! }
//! ```

mod error;
mod executor;
mod registry;
mod tool;
pub mod tools;

pub use error::ToolError;
pub use executor::{RegistryToolExecutor, ToolPolicy};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs, ToolOutput};
pub use tools::{
    Arithmetic, ArithmeticOp, CreateGithubIssue, EvaluateExpression, GetFileContent,
    GetFilesByRepo, GetReposByUser, GitHubClient, GitHubConfig,
};

/// Registry holding the math toolset.
pub fn math_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for op in ArithmeticOp::ALL {
        registry.register(Arithmetic::new(op));
    }
    registry.register(EvaluateExpression::new());
    registry
}

/// Registry holding the GitHub toolset, sharing one API client.
pub fn github_registry(config: GitHubConfig) -> Result<ToolRegistry, ToolError> {
    let client = GitHubClient::new(config)?;
    let mut registry = ToolRegistry::new();
    registry.register(GetReposByUser::new(client.clone()));
    registry.register(GetFilesByRepo::new(client.clone()));
    registry.register(GetFileContent::new(client.clone()));
    registry.register(CreateGithubIssue::new(client));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_math_registry_tools() {
        let registry = math_registry();
        assert_eq!(
            registry.list_tools(),
            vec![
                "add",
                "subtract",
                "multiply",
                "divide",
                "power",
                "modulo",
                "evaluate_expression"
            ]
        );
    }

    #[test]
    fn test_github_registry_tools() {
        let registry = github_registry(GitHubConfig::default()).unwrap();
        assert_eq!(
            registry.list_tools(),
            vec![
                "get_repos_by_user",
                "get_files_by_repo",
                "get_file_content",
                "create_github_issue"
            ]
        );
    }
}
