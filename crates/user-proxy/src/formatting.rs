//! Presentation of replies, status and statistics.

use orchestrator::Specialist;

use crate::context::{DelegationStats, Preferences};

const MAX_SUGGESTIONS: usize = 3;

const GENERIC_SUGGESTIONS: [&str; 2] = [
    "Type 'list agents' to see available specialists",
    "Type 'clear' to start fresh",
];

/// Follow-up suggestions for a reply produced by `specialist`.
///
/// Falls back to generic suggestions when nothing specific applies.
pub fn follow_up_suggestions(body: &str, specialist: Option<Specialist>) -> String {
    let lowered = body.to_lowercase();
    let mut suggestions: Vec<&str> = match specialist {
        Some(Specialist::GitHub) if lowered.contains("repositories") => vec![
            "Ask to browse files in a specific repository",
            "Request file content from a repository",
        ],
        Some(Specialist::GitHub) if lowered.contains("files") => vec![
            "Ask to view content of a specific file",
            "Request to create an issue",
        ],
        Some(Specialist::Math) if body.contains(['+', '-', '*', '/', '=']) => vec![
            "Try another calculation",
            "Ask to evaluate a complex expression",
        ],
        _ => Vec::new(),
    };
    if suggestions.is_empty() {
        suggestions.extend(GENERIC_SUGGESTIONS);
    }

    let mut out = String::from("**💡 What's next?**");
    for (i, suggestion) in suggestions.iter().take(MAX_SUGGESTIONS).enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, suggestion));
    }
    out
}

/// Switch notice, body and suggestions separated by blank lines.
pub fn format_response(
    body: &str,
    switch_notice: Option<&str>,
    specialist: Option<Specialist>,
) -> String {
    let mut parts = Vec::with_capacity(5);
    if let Some(notice) = switch_notice {
        parts.push(notice.to_string());
        parts.push(String::new());
    }
    parts.push(body.to_string());
    parts.push(String::new());
    parts.push(follow_up_suggestions(body, specialist));
    parts.join("\n")
}

pub fn format_status(
    current: Option<Specialist>,
    history_len: usize,
    preferences: &Preferences,
    debug: bool,
) -> String {
    let mut lines = vec![
        "**📊 User Proxy Status**".to_string(),
        String::new(),
        format!(
            "**Current Agent:** {}",
            current.map_or("None", |s| s.as_str())
        ),
        format!("**Conversation Messages:** {}", history_len),
        format!("**User Preferences:** {}", preferences.len()),
        format!("**Debug Mode:** {}", on_off(debug)),
    ];
    if !preferences.is_empty() {
        lines.push(String::new());
        lines.push("**Active Preferences:**".to_string());
        for (key, value) in preferences {
            lines.push(format!("  • {}: {}", key, value));
        }
    }
    lines.join("\n")
}

pub fn format_stats(stats: &DelegationStats) -> String {
    let total = stats.total();
    format!(
        "**📊 Delegation Statistics**\n\n\
         **Total Interactions:** {total}\n\
         \x20 • Proxy Handled (commands): {}\n\
         \x20 • Delegated to Agents: {}\n\
         \x20 • Clarifications Requested: {}\n\n\
         **Delegation Ratio:** {}/{total} queries sent to specialized agents\n\n\
         💡 The proxy should primarily delegate to agents for domain work!\n",
        stats.proxy_handled,
        stats.agent_delegated,
        stats.clarifications,
        stats.agent_delegated,
    )
}

pub fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}
