#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    use timeai::llm::{
        models::{ChatOptions, ChatResponse, Message},
        LlmError, LlmProvider,
    };
    use timeai::orchestrator::Orchestrator;
    use timeai::tools::{ApiKeyBundle, Tool, ToolDescriptor, ToolError, ToolRegistry};

    /// Plays back canned responses and records every message list it was
    /// called with, so tests can assert on the orchestrator's inputs.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
        calls: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().map(String::from).collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call_messages(&self, index: usize) -> Vec<Message> {
            self.calls.lock().unwrap()[index].clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn chat(
            &self,
            messages: &[Message],
            _options: ChatOptions,
        ) -> Result<ChatResponse, LlmError> {
            self.calls.lock().unwrap().push(messages.to_vec());

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(LlmError::Api("script exhausted".to_string()));
            }

            Ok(ChatResponse {
                content: responses.remove(0),
                model: "stub".to_string(),
                usage: None,
            })
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "echo".to_string(),
                description: "Echo parameters back.".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        async fn call(&self, parameters: &Value, _keys: &ApiKeyBundle) -> Result<Value, ToolError> {
            Ok(json!({ "echoed": parameters }))
        }
    }

    struct BrokenTool;

    #[async_trait]
    impl Tool for BrokenTool {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                name: "broken".to_string(),
                description: "Always fails.".to_string(),
                parameters: json!({"type": "object"}),
            }
        }

        async fn call(&self, _parameters: &Value, _keys: &ApiKeyBundle) -> Result<Value, ToolError> {
            Err(ToolError::Network("connection refused".to_string()))
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::with_tools(vec![
            Box::new(EchoTool),
            Box::new(BrokenTool),
        ]))
    }

    fn fenced(body: &str) -> String {
        format!("```tool_call\n{}\n```", body)
    }

    #[tokio::test]
    async fn test_system_prompt_advertises_tools_and_convention() {
        let provider = ScriptedProvider::new(vec!["All done."]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("hi")];
        orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await
            .unwrap();

        let first = provider.call_messages(0);
        assert_eq!(first[0].role, "system");
        assert!(first[0].content.contains("```tool_call"));
        assert!(first[0].content.contains("\"echo\""));
        assert!(first[0].content.contains("\"broken\""));
        assert_eq!(first[1].role, "user");
        assert_eq!(first[1].content, "hi");
    }

    #[tokio::test]
    async fn test_no_tool_short_circuit() {
        let provider = ScriptedProvider::new(vec!["Paris is the capital of France."]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("capital of France?")];
        let response = orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await
            .unwrap();

        assert_eq!(response.content, "Paris is the capital of France.");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_cycle_feeds_results_to_second_call() {
        let first_reply = format!(
            "Let me check.\n{}",
            fenced(r#"{"name": "echo", "parameters": {"query": "rust"}}"#)
        );
        let provider = ScriptedProvider::new(vec![first_reply.as_str(), "Here is what I found."]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("find repos about rust")];
        let response = orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await
            .unwrap();

        assert_eq!(response.content, "Here is what I found.");
        assert_eq!(provider.call_count(), 2);

        let second = provider.call_messages(1);
        let assistant_echo = &second[second.len() - 2];
        assert_eq!(assistant_echo.role, "assistant");
        assert_eq!(assistant_echo.content, first_reply);

        let results_msg = &second[second.len() - 1];
        assert_eq!(results_msg.role, "user");
        assert!(results_msg.content.contains("\"tool\": \"echo\""));
        assert!(results_msg.content.contains("\"echoed\""));
        assert!(results_msg.content.contains("\"query\": \"rust\""));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_skipped() {
        let first_reply = format!(
            "{}\n{}",
            fenced(r#"{"name": "no_such_tool", "parameters": {}}"#),
            fenced(r#"{"name": "echo", "parameters": {"ok": true}}"#)
        );
        let provider = ScriptedProvider::new(vec![first_reply.as_str(), "done"]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("go")];
        orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await
            .unwrap();

        // The unknown call produced no outcome; the valid one still ran
        assert_eq!(provider.call_count(), 2);
        let results_msg = provider.call_messages(1).pop().unwrap();
        assert!(results_msg.content.contains("\"tool\": \"echo\""));
        assert!(!results_msg.content.contains("no_such_tool"));
    }

    #[tokio::test]
    async fn test_partial_failure_isolation_preserves_order() {
        let first_reply = format!(
            "{}\n{}",
            fenced(r#"{"name": "broken", "parameters": {}}"#),
            fenced(r#"{"name": "echo", "parameters": {"n": 1}}"#)
        );
        let provider = ScriptedProvider::new(vec![first_reply.as_str(), "summarized"]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("go")];
        let response = orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await
            .unwrap();

        assert_eq!(response.content, "summarized");
        assert_eq!(provider.call_count(), 2);

        let results_msg = provider.call_messages(1).pop().unwrap();
        assert!(results_msg.content.contains("connection refused"));
        assert!(results_msg.content.contains("\"echoed\""));

        // Failure entry comes first, matching extraction order
        let broken_at = results_msg.content.find("\"tool\": \"broken\"").unwrap();
        let echo_at = results_msg.content.find("\"tool\": \"echo\"").unwrap();
        assert!(broken_at < echo_at);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates() {
        let provider = ScriptedProvider::new(vec![]);
        let orchestrator = Orchestrator::new(provider.clone(), registry());

        let history = vec![Message::user("hi")];
        let result = orchestrator
            .run(&history, ChatOptions::default(), &ApiKeyBundle::default())
            .await;

        assert!(result.is_err());
    }
}
