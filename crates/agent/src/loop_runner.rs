//! The bounded agent loop implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use hackmd_core::agent::AgentConfig;
use hackmd_core::error::AgentError;
use hackmd_core::message::{Conversation, Message, Role};
use hackmd_core::provider::{Provider, ProviderRequest};
use hackmd_tools::NoteToolbox;

/// Everything a finished session hands back to its caller.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// The model's final text answer
    pub response: String,

    /// The full conversation, reusable as history for the next call
    pub conversation: Conversation,

    /// Wire names of the tools invoked, in invocation order
    pub tools_used: Vec<String>,
}

/// The loop that orchestrates model calls and tool execution.
///
/// Holds no mutable state of its own; each `process` call owns its
/// conversation, so one loop can serve sequential sessions with
/// different histories.
pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    toolbox: NoteToolbox,
    config: AgentConfig,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(provider: Arc<dyn Provider>, toolbox: NoteToolbox, config: AgentConfig) -> Self {
        Self {
            provider,
            toolbox,
            config,
        }
    }

    /// Process one user message and drive the session to a final answer.
    ///
    /// `history` carries the conversation from earlier calls; `None`
    /// starts a fresh session seeded with the system prompt. The turn
    /// budget bounds the model⇄tool cycle; exhausting it is an error,
    /// not a truncated answer.
    pub async fn process(
        &self,
        message: &str,
        history: Option<Conversation>,
    ) -> Result<ProcessOutcome, AgentError> {
        let mut conversation = history.unwrap_or_default();

        // Seed the system prompt once per session.
        if !conversation
            .messages
            .first()
            .is_some_and(|m| m.role == Role::System)
        {
            conversation
                .messages
                .insert(0, Message::system(&self.config.system_prompt));
        }
        conversation.push(Message::user(message));

        info!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            model = %self.config.model,
            "Processing message"
        );

        let tool_definitions = self.toolbox.definitions();
        let mut tools_used: Vec<String> = Vec::new();

        for turn in 1..=self.config.max_turns {
            debug!(conversation_id = %conversation.id, turn, "Agent loop turn");

            let request = ProviderRequest {
                model: self.config.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.config.temperature,
                max_tokens: Some(self.config.max_output_tokens),
                tools: tool_definitions.clone(),
            };

            let response = self.provider.complete(request).await?;

            if let Some(usage) = &response.usage {
                debug!(
                    conversation_id = %conversation.id,
                    total_tokens = usage.total_tokens,
                    "Model response received"
                );
            }

            // No tool calls means this is the final text answer.
            if response.message.tool_calls.is_empty() {
                let response_text = response.message.content.clone();
                conversation.push(response.message);
                return Ok(ProcessOutcome {
                    response: response_text,
                    conversation,
                    tools_used,
                });
            }

            let tool_calls = response.message.tool_calls.clone();
            conversation.push(response.message);

            // Calls within one turn are independent of each other;
            // they run sequentially and every envelope goes back in.
            for tc in &tool_calls {
                debug!(tool = %tc.name, call_id = %tc.id, "Executing tool call");
                let start = std::time::Instant::now();
                let envelope = self.toolbox.execute(&tc.name, tc.arguments.clone()).await;
                debug!(
                    tool = %tc.name,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Tool call finished"
                );

                tools_used.push(tc.name.clone());
                conversation.push(Message::tool_result(&tc.id, &tc.name, &envelope));
            }
        }

        warn!(
            conversation_id = %conversation.id,
            limit = self.config.max_turns,
            "Turn budget exhausted without a final answer"
        );
        Err(AgentError::TurnBudgetExceeded {
            limit: self.config.max_turns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use hackmd_core::error::{NoteError, ProviderError};
    use hackmd_core::message::MessageToolCall;
    use hackmd_core::note::{NewNote, Note, NoteStatus, NoteUpdate};
    use hackmd_core::provider::{ProviderResponse, Usage};
    use hackmd_core::service::NoteService;

    /// A provider that returns scripted responses in sequence.
    struct ScriptedProvider {
        responses: Mutex<Vec<ProviderResponse>>,
        calls: Mutex<usize>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<ProviderResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                calls: Mutex::new(0),
            }
        }

        fn call_count(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let mut calls = self.calls.lock().unwrap();
            let mut responses = self.responses.lock().unwrap();
            *calls += 1;
            if responses.is_empty() {
                return Err(ProviderError::InvalidResponse(
                    "scripted provider exhausted".into(),
                ));
            }
            Ok(responses.remove(0))
        }
    }

    /// A provider that requests the same tool forever.
    struct ToolHungryProvider;

    #[async_trait]
    impl Provider for ToolHungryProvider {
        fn name(&self) -> &str {
            "tool-hungry"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(tool_response(vec![make_tool_call(
                "hackmd_list_notes",
                serde_json::json!({}),
            )]))
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            Err(ProviderError::Network("connection refused".into()))
        }
    }

    /// Minimal in-memory note service for loop tests.
    struct FakeService {
        notes: Mutex<BTreeMap<String, Note>>,
    }

    impl FakeService {
        fn new() -> Self {
            Self {
                notes: Mutex::new(BTreeMap::new()),
            }
        }

        fn seeded(entries: &[(&str, &str)]) -> Self {
            let service = Self::new();
            {
                let mut notes = service.notes.lock().unwrap();
                for (id, title) in entries {
                    notes.insert(
                        id.to_string(),
                        Note {
                            id: id.to_string(),
                            title: title.to_string(),
                            content: None,
                            read_permission: None,
                            write_permission: None,
                            created_at: None,
                            last_changed_at: None,
                            publish_link: None,
                            tags: Vec::new(),
                        },
                    );
                }
            }
            service
        }
    }

    #[async_trait]
    impl NoteService for FakeService {
        async fn list_notes(&self) -> Result<Vec<Note>, NoteError> {
            Ok(self.notes.lock().unwrap().values().cloned().collect())
        }
        async fn read_note(&self, note_id: &str) -> Result<Note, NoteError> {
            self.notes
                .lock()
                .unwrap()
                .get(note_id)
                .cloned()
                .ok_or_else(|| NoteError::NotFound(note_id.to_string()))
        }
        async fn create_note(&self, note: NewNote) -> Result<Note, NoteError> {
            let created = Note {
                id: "created-1".into(),
                title: note.title,
                content: Some(note.content),
                read_permission: note.read_permission,
                write_permission: note.write_permission,
                created_at: None,
                last_changed_at: None,
                publish_link: None,
                tags: Vec::new(),
            };
            self.notes
                .lock()
                .unwrap()
                .insert(created.id.clone(), created.clone());
            Ok(created)
        }
        async fn update_note(&self, note_id: &str, update: NoteUpdate) -> Result<Note, NoteError> {
            let mut notes = self.notes.lock().unwrap();
            let note = notes
                .get_mut(note_id)
                .ok_or_else(|| NoteError::NotFound(note_id.to_string()))?;
            note.content = Some(update.content);
            Ok(note.clone())
        }
        async fn delete_note(&self, note_id: &str) -> Result<NoteStatus, NoteError> {
            self.notes
                .lock()
                .unwrap()
                .remove(note_id)
                .map(|_| NoteStatus::deleted())
                .ok_or_else(|| NoteError::NotFound(note_id.to_string()))
        }
        async fn search_notes(&self, keyword: &str) -> Result<Vec<Note>, NoteError> {
            let needle = keyword.to_lowercase();
            Ok(self
                .notes
                .lock()
                .unwrap()
                .values()
                .filter(|n| n.title.to_lowercase().contains(&needle))
                .cloned()
                .collect())
        }
    }

    fn text_response(text: &str) -> ProviderResponse {
        ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "gemini-2.5-flash".into(),
        }
    }

    fn tool_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
        let mut msg = Message::assistant("");
        msg.tool_calls = tool_calls;
        ProviderResponse {
            message: msg,
            usage: None,
            model: "gemini-2.5-flash".into(),
        }
    }

    fn make_tool_call(name: &str, args: serde_json::Value) -> MessageToolCall {
        MessageToolCall {
            id: format!("call_0_{name}"),
            name: name.to_string(),
            arguments: args,
        }
    }

    fn loop_with(provider: Arc<dyn Provider>, service: FakeService) -> AgentLoop {
        AgentLoop::new(
            provider,
            NoteToolbox::new(Arc::new(service)),
            AgentConfig::default(),
        )
    }

    #[tokio::test]
    async fn plain_text_answer_ends_the_session() {
        let agent = loop_with(
            Arc::new(ScriptedProvider::new(vec![text_response(
                "You have no notes yet.",
            )])),
            FakeService::new(),
        );

        let outcome = agent.process("Do I have notes?", None).await.unwrap();
        assert_eq!(outcome.response, "You have no notes yet.");
        assert!(outcome.tools_used.is_empty());
        // system + user + assistant
        assert_eq!(outcome.conversation.len(), 3);
        assert_eq!(outcome.conversation.messages[0].role, Role::System);
    }

    #[tokio::test]
    async fn tool_call_turn_appends_envelope_and_records_usage() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(vec![make_tool_call("hackmd_list_notes", serde_json::json!({}))]),
            text_response("You have one note: Meeting notes."),
        ]));
        let agent = loop_with(provider.clone(), FakeService::seeded(&[("a1", "Meeting notes")]));

        let outcome = agent.process("List my notes", None).await.unwrap();
        assert_eq!(outcome.response, "You have one note: Meeting notes.");
        assert_eq!(outcome.tools_used, vec!["hackmd_list_notes"]);
        assert_eq!(provider.call_count(), 2);

        // system, user, assistant(tool call), tool result, assistant
        assert_eq!(outcome.conversation.len(), 5);
        let tool_msg = &outcome.conversation.messages[3];
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_name.as_deref(), Some("hackmd_list_notes"));
        let envelope: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(envelope.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn multiple_calls_in_one_turn_run_in_request_order() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(vec![
                make_tool_call("hackmd_create_note", serde_json::json!({"title": "T", "content": "C"})),
                make_tool_call("hackmd_list_notes", serde_json::json!({})),
            ]),
            text_response("Created and listed."),
        ]));
        let agent = loop_with(provider, FakeService::new());

        let outcome = agent.process("Create a note then list", None).await.unwrap();
        assert_eq!(
            outcome.tools_used,
            vec!["hackmd_create_note", "hackmd_list_notes"]
        );
    }

    #[tokio::test]
    async fn error_envelope_goes_back_to_the_model_not_the_caller() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(vec![make_tool_call("hackmd_read_note", serde_json::json!({}))]),
            text_response("I need a note id to do that."),
        ]));
        let agent = loop_with(provider, FakeService::new());

        let outcome = agent.process("Read my note", None).await.unwrap();
        assert_eq!(outcome.response, "I need a note id to do that.");

        let tool_msg = &outcome.conversation.messages[3];
        let envelope: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(envelope["error"], "noteId is required");
    }

    #[tokio::test]
    async fn unknown_tool_request_is_reported_via_envelope() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_response(vec![make_tool_call("hackmd_frobnicate", serde_json::json!({}))]),
            text_response("That tool does not exist."),
        ]));
        let agent = loop_with(provider, FakeService::new());

        let outcome = agent.process("Frobnicate!", None).await.unwrap();
        let tool_msg = &outcome.conversation.messages[3];
        let envelope: serde_json::Value = serde_json::from_str(&tool_msg.content).unwrap();
        assert_eq!(envelope["error"], "Unknown tool: hackmd_frobnicate");
        assert_eq!(outcome.tools_used, vec!["hackmd_frobnicate"]);
    }

    #[tokio::test]
    async fn turn_budget_exhaustion_is_a_reported_failure() {
        let config = AgentConfig {
            max_turns: 3,
            ..AgentConfig::default()
        };
        let agent = AgentLoop::new(
            Arc::new(ToolHungryProvider),
            NoteToolbox::new(Arc::new(FakeService::new())),
            config,
        );

        let err = agent.process("Loop forever", None).await.unwrap_err();
        match err {
            AgentError::TurnBudgetExceeded { limit } => assert_eq!(limit, 3),
            other => panic!("expected TurnBudgetExceeded, got {other}"),
        }
    }

    #[tokio::test]
    async fn history_is_carried_and_system_prompt_not_duplicated() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            text_response("First answer."),
            text_response("Second answer."),
        ]));
        let agent = loop_with(provider, FakeService::new());

        let first = agent.process("First question", None).await.unwrap();
        let second = agent
            .process("Second question", Some(first.conversation))
            .await
            .unwrap();

        let system_count = second
            .conversation
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_count, 1);
        // 3 from the first session + user + assistant
        assert_eq!(second.conversation.len(), 5);
        assert_eq!(second.response, "Second answer.");
    }

    #[tokio::test]
    async fn provider_failure_propagates_typed() {
        let agent = loop_with(Arc::new(FailingProvider), FakeService::new());
        let err = agent.process("Hello", None).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(_)));
    }
}
