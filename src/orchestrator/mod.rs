pub mod extract;

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::llm::{
    models::{ChatOptions, ChatResponse, Message},
    LlmError, LlmProvider,
};
use crate::tools::{ApiKeyBundle, ToolRegistry};
use extract::extract_tool_calls;

/// One dispatched call: `result` on success, `error` on failure, never both.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub tool: String,
    pub parameters: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs one orchestration cycle: prompt build, first model call, tool
/// dispatch, and (only when tools were requested) a single re-prompt with
/// the accumulated results.
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LlmProvider>, registry: Arc<ToolRegistry>) -> Self {
        Self { llm, registry }
    }

    pub async fn run(
        &self,
        history: &[Message],
        options: ChatOptions,
        keys: &ApiKeyBundle,
    ) -> Result<ChatResponse, LlmError> {
        let mut messages = Vec::with_capacity(history.len() + 3);
        messages.push(Message::system(self.system_prompt()));
        messages.extend_from_slice(history);

        let first = self.llm.chat(&messages, options.clone()).await?;

        let calls = extract_tool_calls(&first.content);
        if calls.is_empty() {
            return Ok(first);
        }

        info!("Model requested {} tool call(s)", calls.len());
        let outcomes = self.dispatch(&calls, keys).await;

        messages.push(Message::assistant(first.content.clone()));
        messages.push(Message::user(tool_results_prompt(&outcomes)));

        self.llm.chat(&messages, options).await
    }

    /// Executes extracted calls strictly in extraction order. Unknown or
    /// unnamed calls are skipped; a failing executor becomes an `error`
    /// outcome and the remaining calls still run.
    async fn dispatch(&self, calls: &[Value], keys: &ApiKeyBundle) -> Vec<ToolOutcome> {
        let mut outcomes = Vec::with_capacity(calls.len());

        for call in calls {
            let name = match call.get("name").and_then(Value::as_str) {
                Some(n) => n,
                None => {
                    warn!("Skipping tool_call without a name field");
                    continue;
                }
            };
            let parameters = call.get("parameters").cloned().unwrap_or(Value::Null);

            let tool = match self.registry.get(name) {
                Some(t) => t,
                None => {
                    warn!("Skipping unknown tool: {}", name);
                    continue;
                }
            };

            match tool.call(&parameters, keys).await {
                Ok(result) => outcomes.push(ToolOutcome {
                    tool: name.to_string(),
                    parameters,
                    result: Some(result),
                    error: None,
                }),
                Err(e) => {
                    warn!("Tool {} failed: {}", name, e);
                    outcomes.push(ToolOutcome {
                        tool: name.to_string(),
                        parameters,
                        result: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        outcomes
    }

    fn system_prompt(&self) -> String {
        let descriptors = serde_json::to_string_pretty(&self.registry.descriptors())
            .unwrap_or_else(|_| "[]".to_string());

        format!(
            "You are Time AI, a helpful assistant with access to external tools.\n\
             \n\
             To call a tool, emit a fenced code block labeled tool_call containing a single JSON object:\n\
             \n\
             ```tool_call\n\
             {{\"name\": \"<tool name>\", \"parameters\": {{ ... }}}}\n\
             ```\n\
             \n\
             Emit one block per call; you may emit several blocks to call several tools. \
             Only call a tool when the user's request needs live external data. \
             If no tool is needed, answer directly.\n\
             \n\
             Available tools:\n{}",
            descriptors
        )
    }
}

fn tool_results_prompt(outcomes: &[ToolOutcome]) -> String {
    let results = serde_json::to_string_pretty(outcomes).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Here are the results of your tool calls:\n\n{}\n\n\
         Answer the user's original request using these results. \
         If a tool returned an error, explain the failure in plain language.",
        results
    )
}
