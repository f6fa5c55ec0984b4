//! Out-of-band commands recognised by the proxy.

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    /// Clear conversation history and every specialist thread.
    Clear,
    /// Clear user preferences.
    ClearContext,
    SetPreference { key: String, value: String },
    ToggleDebug,
    Stats,
    ListAgents,
    Switch(String),
}

impl Command {
    /// Parse `input`, or `None` if it is not a command.
    ///
    /// Keywords are case-insensitive. Preference keys are lowercased; values
    /// keep their case.
    pub fn parse(input: &str) -> Option<Command> {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();

        let command = match lowered.as_str() {
            "help" | "?" => Command::Help,
            "status" => Command::Status,
            "clear" | "reset" => Command::Clear,
            "clear context" => Command::ClearContext,
            "debug" => Command::ToggleDebug,
            "stats" => Command::Stats,
            "list agents" => Command::ListAgents,
            _ if lowered.starts_with("switch ") => {
                let name = trimmed.get("switch ".len()..)?.trim();
                if name.is_empty() {
                    return None;
                }
                Command::Switch(name.to_lowercase())
            }
            _ if lowered.starts_with("set ") => {
                let (key, value) = trimmed.get("set ".len()..)?.split_once('=')?;
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() {
                    return None;
                }
                Command::SetPreference {
                    key: key.to_lowercase(),
                    value: value.to_string(),
                }
            }
            _ => return None,
        };
        Some(command)
    }

    /// Whether the proxy answers this itself, as opposed to asking the orchestrator.
    pub fn is_proxy_local(&self) -> bool {
        !matches!(self, Command::ListAgents | Command::Switch(_))
    }
}

pub const HELP_TEXT: &str = r#"**🤖 User Proxy Agent - Help**

**Proxy Commands (handled by proxy, not delegated):**
  • `help` or `?` - Show this help message
  • `status` - Show current agent and context
  • `clear` or `reset` - Clear conversation history
  • `clear context` - Clear user preferences
  • `set <key>=<value>` - Set a user preference
  • `debug` - Toggle debug mode (shows delegation flow)
  • `stats` - Show delegation statistics

**Orchestrator Commands (delegated to orchestrator):**
  • `list agents` - List all available specialized agents
  • `switch <agent>` - Manually switch to a specific agent

**User Preferences:**
  • `set default_repo=owner/repo` - Set default GitHub repository
  • `set format=detailed` - Set response format preference

**Natural Queries:**
  Just ask naturally! The proxy will route you to the right specialist:
  • "Show me repositories for octocat" → GitHub Agent
  • "What's 25 * 4?" → Math Agent
  • "List files in my repo" → GitHub Agent (with context)

**Tips:**
  • The proxy remembers your conversation context
  • It will ask for clarification when needed
  • Suggestions appear after each response to guide you
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(Command::parse("HELP"), Some(Command::Help));
        assert_eq!(Command::parse("?"), Some(Command::Help));
        assert_eq!(Command::parse(" reset "), Some(Command::Clear));
        assert_eq!(Command::parse("clear context"), Some(Command::ClearContext));
        assert_eq!(Command::parse("list agents"), Some(Command::ListAgents));
        assert_eq!(Command::parse("stats"), Some(Command::Stats));
    }

    #[test]
    fn test_parse_switch() {
        assert_eq!(
            Command::parse("switch Calculator"),
            Some(Command::Switch("calculator".into()))
        );
        assert_eq!(Command::parse("switch "), None);
    }

    #[test]
    fn test_parse_set_keeps_value_case() {
        assert_eq!(
            Command::parse("set Default_Repo = Acme/Widgets"),
            Some(Command::SetPreference {
                key: "default_repo".into(),
                value: "Acme/Widgets".into(),
            })
        );
        assert_eq!(Command::parse("set nothing"), None);
    }

    #[test]
    fn test_queries_are_not_commands() {
        assert_eq!(Command::parse("what is 2 + 2"), None);
        assert_eq!(Command::parse("help me with my repo"), None);
    }

    #[test]
    fn test_locality() {
        assert!(Command::Help.is_proxy_local());
        assert!(!Command::ListAgents.is_proxy_local());
        assert!(!Command::Switch("math".into()).is_proxy_local());
    }
}
