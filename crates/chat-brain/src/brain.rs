//! ChatBrain implementation using a chat-completions API.

use std::sync::Arc;

use brain_core::{
    async_trait, hash_prompt, Brain, BrainChunk, BrainError, BrainStream, ConversationHistory,
    InboundMessage, OutboundMessage, ToolExecutor, ToolRequest, ToolResult,
};
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolCall,
    ToolDefinition,
};
use crate::config::ChatBrainConfig;

const EMPTY_REPLY: &str = "I apologize, but I couldn't generate a response.";

/// A brain backed by a chat-completions model, optionally bound to a toolset.
///
/// History is kept per thread id, so handing the brain a new thread id
/// starts a fresh conversation.
pub struct ChatBrain {
    name: String,
    client: Client,
    config: ChatBrainConfig,
    history: ConversationHistory,
    tools: Option<Arc<dyn ToolExecutor>>,
    tool_definitions: Vec<ToolDefinition>,
    system_prompt_hash: Option<String>,
}

/// Progress of one inbound message through the tool-calling loop.
struct Turn {
    inbound: InboundMessage,
    messages: Vec<ChatMessage>,
    /// Calls requested by the model and not yet executed.
    pending: Vec<ToolCall>,
    rounds: usize,
    finished: bool,
}

impl ChatBrain {
    /// Create a brain without tools.
    pub fn new(config: ChatBrainConfig) -> Result<Self, BrainError> {
        Self::build(config, None)
    }

    /// Create a brain whose model may call the executor's tools.
    pub fn with_tools<E>(config: ChatBrainConfig, executor: E) -> Result<Self, BrainError>
    where
        E: ToolExecutor + 'static,
    {
        Self::build(config, Some(Arc::new(executor)))
    }

    fn build(
        config: ChatBrainConfig,
        tools: Option<Arc<dyn ToolExecutor>>,
    ) -> Result<Self, BrainError> {
        let client = Client::builder().build().map_err(|e| {
            BrainError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        let tool_definitions: Vec<ToolDefinition> = tools
            .as_ref()
            .map(|executor| executor.tool_specs().iter().map(ToolDefinition::from).collect())
            .unwrap_or_default();

        let system_prompt_hash = config.system_prompt.as_deref().map(hash_prompt);
        if let Some(ref hash) = system_prompt_hash {
            debug!("ChatBrain system prompt fingerprint: {}", hash);
        }

        info!(
            "ChatBrain initialized with model: {}, tools: {}",
            config.model,
            tools.as_ref().map_or(0, |_| tool_definitions.len())
        );

        Ok(Self {
            name: "ChatBrain".to_string(),
            client,
            history: ConversationHistory::new(config.max_history_turns),
            config,
            tools,
            tool_definitions,
            system_prompt_hash,
        })
    }

    /// Set the name reported by [`Brain::name`].
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &ChatBrainConfig {
        &self.config
    }

    pub fn system_prompt_hash(&self) -> Option<&str> {
        self.system_prompt_hash.as_deref()
    }

    /// Tools advertised to the model.
    pub fn tool_definitions(&self) -> &[ToolDefinition] {
        &self.tool_definitions
    }

    /// Clear conversation history for one thread.
    pub async fn clear_history(&self, thread_id: &str) {
        self.history.clear(thread_id).await;
    }

    async fn build_messages(&self, thread_id: &str, user_text: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::new();

        if let Some(ref system_prompt) = self.config.system_prompt {
            messages.push(ChatMessage::system(system_prompt.clone()));
        }

        for msg in self.history.get(thread_id).await {
            messages.push(if msg.role == "user" {
                ChatMessage::user(msg.content)
            } else {
                ChatMessage::assistant(msg.content)
            });
        }

        messages.push(ChatMessage::user(user_text));
        messages
    }

    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        offer_tools: bool,
    ) -> Result<ChatCompletionResponse, BrainError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: offer_tools.then(|| self.tool_definitions.clone()),
        };

        debug!("Sending chat completion request: {:?}", request);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);
            return Err(BrainError::ProcessingFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                message
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))
    }

    async fn run_pending_tools(&self, turn: &mut Turn) {
        let Some(executor) = self.tools.as_ref() else {
            turn.pending.clear();
            return;
        };

        for call in std::mem::take(&mut turn.pending) {
            let result = match ToolRequest::from_call(
                call.id.clone(),
                call.function.name.clone(),
                &call.function.arguments,
            ) {
                Ok(request) => executor.execute(request).await,
                Err(e) => ToolResult::error(&call.id, format!("invalid arguments: {}", e)),
            };

            debug!(tool = %call.function.name, success = result.success, "tool result");
            turn.messages
                .push(ChatMessage::tool(result.tool_call_id, result.content));
        }
    }

    /// Run one model round, yielding either the tools it requested or its answer.
    async fn advance(&self, turn: &mut Turn) -> Result<BrainChunk, BrainError> {
        if turn.messages.is_empty() {
            turn.messages = self
                .build_messages(&turn.inbound.thread_id, &turn.inbound.text)
                .await;
        }
        if !turn.pending.is_empty() {
            self.run_pending_tools(turn).await;
        }

        let offer_tools = !self.tool_definitions.is_empty()
            && turn.rounds < self.config.max_tool_rounds;
        let completion = self.chat_completion(&turn.messages, offer_tools).await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            BrainError::ProcessingFailed("response contained no choices".to_string())
        })?;

        let calls = choice.message.tool_calls.unwrap_or_default();
        if offer_tools && !calls.is_empty() {
            turn.rounds += 1;
            let names: Vec<String> = calls.iter().map(|c| c.function.name.clone()).collect();
            info!(brain = %self.name, round = turn.rounds, tools = ?names, "TOOL_CALLS");

            turn.messages
                .push(ChatMessage::assistant_tool_calls(choice.message.content, calls.clone()));
            turn.pending = calls;
            return Ok(BrainChunk::tools(names));
        }

        let text = choice
            .message
            .content
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                warn!(brain = %self.name, "No content in response, using default");
                EMPTY_REPLY.to_string()
            });

        if self.config.max_history_turns > 0 {
            self.history
                .add_exchange(&turn.inbound.thread_id, &turn.inbound.text, &text)
                .await;
        }

        turn.finished = true;
        Ok(BrainChunk::text(text))
    }
}

#[async_trait]
impl Brain for ChatBrain {
    async fn process(&self, message: InboundMessage) -> Result<OutboundMessage, BrainError> {
        let mut reply = OutboundMessage::reply_to(&message, String::new());
        let mut chunks = self.process_stream(message);

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            reply.tool_calls.extend(chunk.tool_calls);
            if let Some(text) = chunk.text {
                reply.text.push_str(&text);
            }
        }

        Ok(reply)
    }

    fn process_stream<'a>(&'a self, message: InboundMessage) -> BrainStream<'a> {
        debug!(brain = %self.name, thread = %message.thread_id, "Processing message: {}", message.text);

        let turn = Turn {
            inbound: message,
            messages: Vec::new(),
            pending: Vec::new(),
            rounds: 0,
            finished: false,
        };

        stream::unfold(turn, move |mut turn| async move {
            if turn.finished {
                return None;
            }
            let item = self.advance(&mut turn).await;
            if item.is_err() {
                turn.finished = true;
            }
            Some((item, turn))
        })
        .boxed()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::{ToolSpec, ToolResult};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    struct StubTools;

    #[async_trait]
    impl ToolExecutor for StubTools {
        async fn execute(&self, request: ToolRequest) -> ToolResult {
            ToolResult::success(&request.id, "ok")
        }

        fn tool_specs(&self) -> Vec<ToolSpec> {
            vec![ToolSpec {
                name: "add".to_string(),
                description: "Add two numbers".to_string(),
                parameters: json!({"type": "object"}),
            }]
        }
    }

    #[test]
    fn test_brain_name() {
        let brain = ChatBrain::new(ChatBrainConfig::default()).unwrap();
        assert_eq!(brain.name(), "ChatBrain");

        let brain = brain.named("MathAgent");
        assert_eq!(brain.name(), "MathAgent");
    }

    #[test]
    fn test_tool_definitions_from_executor() {
        let brain = ChatBrain::with_tools(ChatBrainConfig::default(), StubTools).unwrap();
        assert_eq!(brain.tool_definitions().len(), 1);
        assert_eq!(brain.tool_definitions()[0].function.name, "add");

        let plain = ChatBrain::new(ChatBrainConfig::default()).unwrap();
        assert!(plain.tool_definitions().is_empty());
    }

    #[test]
    fn test_system_prompt_hash() {
        let config = ChatBrainConfig::builder().system_prompt("You are a math agent").build();
        let brain = ChatBrain::new(config).unwrap();
        assert_eq!(
            brain.system_prompt_hash(),
            Some(hash_prompt("You are a math agent").as_str())
        );
    }

    #[tokio::test]
    async fn test_build_messages_includes_history() {
        let config = ChatBrainConfig::builder().system_prompt("instructions").build();
        let brain = ChatBrain::new(config).unwrap();
        brain.history.add_exchange("t1", "5 + 3?", "8").await;

        let messages = brain.build_messages("t1", "times 2?").await;
        let roles: Vec<_> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[3].content.as_deref(), Some("times 2?"));

        let fresh = brain.build_messages("t2", "hello").await;
        assert_eq!(fresh.len(), 2);
    }

    /// Serves the canned chat-completions replies in order, one per
    /// connection, and returns the request bodies it received.
    async fn serve_completions(replies: Vec<Value>) -> (String, JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut bodies = Vec::new();
            for reply in replies {
                let (mut socket, _) = listener.accept().await.unwrap();
                bodies.push(read_request_body(&mut socket).await);

                let payload = reply.to_string();
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    payload.len(),
                    payload
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            bodies
        });

        (url, handle)
    }

    async fn read_request_body(socket: &mut TcpStream) -> Value {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length: usize = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|v| v.trim().parse().unwrap())
                    .unwrap_or(0);
                let start = end + 4;
                if buf.len() >= start + length {
                    return serde_json::from_slice(&buf[start..start + length]).unwrap();
                }
            }
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request was complete");
            buf.extend_from_slice(&chunk[..n]);
        }
    }

    fn tool_call_reply(content: Option<&str>) -> Value {
        json!({
            "choices": [{
                "message": {
                    "content": content,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "add", "arguments": "{\"a\": 5, \"b\": 3}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })
    }

    fn text_reply(content: &str) -> Value {
        json!({
            "choices": [{"message": {"content": content}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
        })
    }

    #[tokio::test]
    async fn test_tool_round_then_answer() {
        let (url, server) =
            serve_completions(vec![tool_call_reply(None), text_reply("5 + 3 = 8")]).await;
        let config = ChatBrainConfig::builder().api_url(url).build();
        let brain = ChatBrain::with_tools(config, StubTools).unwrap();

        let chunks: Vec<BrainChunk> = brain
            .process_stream(InboundMessage::new("t1", "what is 5 + 3"))
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(
            chunks,
            vec![BrainChunk::tools(["add"]), BrainChunk::text("5 + 3 = 8")]
        );

        let bodies = server.await.unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0]["tools"][0]["function"]["name"], "add");

        let followup = bodies[1]["messages"].as_array().unwrap();
        let roles: Vec<_> = followup.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["user", "assistant", "tool"]);
        assert_eq!(followup[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(followup[2]["tool_call_id"], "call_1");
        assert_eq!(followup[2]["content"], "ok");

        let history: Vec<_> = brain
            .history
            .get("t1")
            .await
            .into_iter()
            .map(|m| (m.role, m.content))
            .collect();
        assert_eq!(
            history,
            vec![
                ("user".to_string(), "what is 5 + 3".to_string()),
                ("assistant".to_string(), "5 + 3 = 8".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_tool_rounds_are_capped() {
        let (url, server) = serve_completions(vec![
            tool_call_reply(None),
            tool_call_reply(Some("I need one more lookup.")),
        ])
        .await;
        let config = ChatBrainConfig::builder().api_url(url).max_tool_rounds(1).build();
        let brain = ChatBrain::with_tools(config, StubTools).unwrap();

        let reply = brain
            .process(InboundMessage::new("t1", "what is 5 + 3"))
            .await
            .unwrap();
        assert_eq!(reply.text, "I need one more lookup.");
        assert_eq!(reply.tool_calls.len(), 1);

        let bodies = server.await.unwrap();
        assert_eq!(bodies.len(), 2);
        assert!(bodies[0].get("tools").is_some());
        assert!(bodies[1].get("tools").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = ChatBrainConfig::builder().api_url("http://127.0.0.1:9").build();
        let brain = ChatBrain::new(config).unwrap();

        let err = brain
            .process(InboundMessage::new("t1", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, BrainError::Network(_)));
    }
}
