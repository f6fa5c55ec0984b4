//! End-to-end conversation flows through the proxy and orchestrator.

use std::sync::Arc;

use futures::StreamExt;
use mock_brain::{FailingBrain, ScriptedBrain};
use orchestrator::{Orchestrator, Specialist, StaticSpecialistFactory, StrategyKind};
use user_proxy::{ProxyError, Role, UserProxy, DEFAULT_REPO_KEY};

struct Harness {
    proxy: UserProxy,
    github: Arc<ScriptedBrain>,
    math: Arc<ScriptedBrain>,
}

fn harness(kind: StrategyKind) -> Harness {
    let github = Arc::new(ScriptedBrain::replying("github", "Found 2 repositories"));
    let math = Arc::new(
        ScriptedBrain::new("math")
            .tools(["multiply"])
            .text("15 * 23 = 345"),
    );
    let factory = StaticSpecialistFactory::new()
        .with_agent(Specialist::GitHub, github.clone())
        .with_agent(Specialist::Math, math.clone());
    let proxy = UserProxy::new(Orchestrator::new(kind, Arc::new(factory)));
    Harness {
        proxy,
        github,
        math,
    }
}

#[tokio::test]
async fn test_math_query_is_routed_and_formatted() {
    let mut h = harness(StrategyKind::Keyword);

    let reply = h.proxy.process_message("What is 15 * 23?").await.unwrap();

    assert!(reply.starts_with("🤖 Routed to: Math Agent\n\n15 * 23 = 345\n\n📋 Tools used: multiply"));
    assert!(reply.contains("**💡 What's next?**\n  1. Try another calculation"));
    assert_eq!(h.math.received_texts(), vec!["What is 15 * 23?"]);
    assert_eq!(h.proxy.current_agent(), Some(Specialist::Math));
    assert_eq!(h.proxy.stats().agent_delegated, 1);

    let entries: Vec<_> = h.proxy.history().entries().cloned().collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].role, Role::User);
    assert_eq!(entries[1].content, reply);
}

#[tokio::test]
async fn test_clarification_round_trip() {
    let mut h = harness(StrategyKind::Keyword);

    let reply = h.proxy.process_message("it").await.unwrap();
    assert!(reply.starts_with("🤔 **Clarification Needed**"));
    assert!(reply.contains("What specifically are you referring to?"));
    assert!(h.proxy.is_waiting_for_clarification());
    assert!(h.github.received().is_empty());

    let reply = h.proxy.process_message("the repository").await.unwrap();
    assert!(!h.proxy.is_waiting_for_clarification());
    assert!(reply.contains("Found 2 repositories"));
    assert_eq!(h.github.received_texts(), vec!["the repository"]);

    let stats = h.proxy.stats();
    assert_eq!(stats.clarifications, 1);
    assert_eq!(stats.agent_delegated, 1);
}

#[tokio::test]
async fn test_accepting_suggested_repository() {
    let mut h = harness(StrategyKind::Keyword);

    let reply = h.proxy.process_message("show me the latest commits").await.unwrap();
    assert!(reply.contains("Which repository would you like to work with?"));

    let reply = h.proxy.process_message("yes").await.unwrap();
    assert!(reply.starts_with("✅ Set default repository to: octocat/Hello-World"));
    assert_eq!(h.proxy.preference(DEFAULT_REPO_KEY), Some("octocat/Hello-World"));
    assert!(h.github.received().is_empty());
}

#[tokio::test]
async fn test_declined_suggestion_is_handled_as_a_fresh_query() {
    let mut h = harness(StrategyKind::Keyword);

    h.proxy.process_message("show me the latest commits").await.unwrap();
    let reply = h.proxy.process_message("no").await.unwrap();

    // "no" on its own is vague, so it asks again rather than routing
    assert!(reply.contains("Could you be more specific?"));
    assert!(h.proxy.preference(DEFAULT_REPO_KEY).is_none());
    assert_eq!(h.proxy.stats().clarifications, 2);
    assert!(h.github.received().is_empty());
}

#[tokio::test]
async fn test_default_repository_annotates_outbound_text_only() {
    let mut h = harness(StrategyKind::Keyword);
    h.proxy.handle_command("set default_repo=acme/widgets").unwrap();

    h.proxy.process_message("show me the commits").await.unwrap();

    assert_eq!(
        h.github.received_texts(),
        vec!["show me the commits (using repository: acme/widgets)"]
    );
    let first = h.proxy.history().entries().next().cloned().unwrap();
    assert_eq!(first.role, Role::User);
    assert_eq!(first.content, "show me the commits");
}

#[tokio::test]
async fn test_unroutable_query_returns_help() {
    let mut h = harness(StrategyKind::Keyword);
    h.proxy.handle_command("switch github").unwrap();

    let reply = h.proxy.process_message("tell me a joke").await.unwrap();

    assert!(reply.starts_with("I'm not sure which specialist can help you best."));
    assert_eq!(h.proxy.current_agent(), Some(Specialist::GitHub));
    assert!(h.github.received().is_empty());
    assert!(h.math.received().is_empty());
}

#[tokio::test]
async fn test_streaming_reassembles_into_history() {
    let mut h = harness(StrategyKind::Rule);

    let fragments: Vec<String> = h
        .proxy
        .process_message_stream("12 * 4")
        .await
        .unwrap()
        .map(|fragment| fragment.unwrap())
        .collect()
        .await;

    assert_eq!(fragments[0], "\n🔧 Calling tool: multiply\n");
    assert_eq!(fragments[1], "15 * 23 = 345");
    assert_eq!(fragments[2], "\n\n📋 Tools used: multiply");
    assert_eq!(fragments[3], "\n\n🤖 Rule-based routing to: Math Agent");
    assert!(fragments[4].starts_with("\n\n**💡 What's next?**"));

    let last = h.proxy.history().last().cloned().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last
        .content
        .starts_with("🤖 Rule-based routing to: Math Agent\n\n15 * 23 = 345\n\n📋 Tools used: multiply"));
}

#[tokio::test]
async fn test_streamed_clarification_is_a_single_fragment() {
    let mut h = harness(StrategyKind::Keyword);

    let fragments: Vec<_> = h.proxy.process_message_stream("ok").await.unwrap().collect().await;

    assert_eq!(fragments.len(), 1);
    assert!(fragments[0].as_ref().unwrap().contains("Could you be more specific?"));
}

#[tokio::test]
async fn test_agent_failure_surfaces() {
    let factory = StaticSpecialistFactory::new()
        .with_agent(Specialist::GitHub, Arc::new(FailingBrain::new("rate limited")))
        .with_agent(Specialist::Math, Arc::new(FailingBrain::new("rate limited")));
    let mut proxy = UserProxy::new(Orchestrator::new(StrategyKind::Keyword, Arc::new(factory)));

    let result = proxy.process_message("calculate 2 + 2").await;

    assert!(matches!(result, Err(ProxyError::Orchestrator(_))));
    assert!(result.unwrap_err().to_string().contains("rate limited"));
}

#[tokio::test]
async fn test_commands() {
    let mut h = harness(StrategyKind::Keyword);

    assert!(h.proxy.handle_command("help").unwrap().contains("User Proxy Agent - Help"));
    assert_eq!(h.proxy.handle_command("debug").unwrap(), "✅ Debug mode: ON");
    assert!(h.proxy.is_debug());

    let switched = h.proxy.handle_command("switch calculator").unwrap();
    assert_eq!(switched, "✅ Switched to Math Agent");
    let unknown = h.proxy.handle_command("switch nonexistent").unwrap();
    assert!(unknown.starts_with("❌ Unknown agent: nonexistent."));
    assert_eq!(h.proxy.current_agent(), Some(Specialist::Math));

    assert!(h.proxy.handle_command("list agents").unwrap().contains("**Math Agent** 🟢 ACTIVE"));
    assert!(h.proxy.handle_command("status").unwrap().contains("**Current Agent:** math"));
    assert!(h.proxy.handle_command("what is 2 + 2").is_none());

    // help and status count, debug/list/switch do not
    assert_eq!(h.proxy.stats().proxy_handled, 2);
}

#[tokio::test]
async fn test_clear_resets_history_and_current_agent() {
    let mut h = harness(StrategyKind::Keyword);
    h.proxy.process_message("What is 15 * 23?").await.unwrap();
    h.proxy.set_preference("format", "detailed");

    assert_eq!(h.proxy.handle_command("clear").unwrap(), "✅ Conversation history cleared");
    assert!(h.proxy.history().is_empty());
    assert!(h.proxy.current_agent().is_none());
    assert_eq!(h.proxy.preference("format"), Some("detailed"));

    assert_eq!(h.proxy.handle_command("clear context").unwrap(), "✅ User context cleared");
    assert!(h.proxy.preferences().is_empty());
}
