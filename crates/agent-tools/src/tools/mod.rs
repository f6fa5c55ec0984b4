//! Built-in toolsets.

mod github;
mod math;

pub use github::{
    CreateGithubIssue, GetFileContent, GetFilesByRepo, GetReposByUser, GitHubClient, GitHubConfig,
};
pub use math::{Arithmetic, ArithmeticOp, EvaluateExpression};
