pub mod figma;
pub mod github;
pub mod jira;
pub mod sheets;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ToolsConfig;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// What the model is told about a tool. Serialized verbatim into the
/// system prompt and the /api/tools listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Per-request secrets supplied by the caller. Never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyBundle {
    pub figma: Option<String>,
    pub github: Option<String>,
    pub jira_domain: Option<String>,
    pub jira_email: Option<String>,
    pub jira_token: Option<String>,
    pub google_sheets: Option<String>,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, parameters: &Value, keys: &ApiKeyBundle) -> Result<Value, ToolError>;
}

/// Immutable after construction; built once at startup and shared by Arc.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            tools: vec![
                Box::new(figma::FigmaTool::new(config.timeout_secs)),
                Box::new(github::GithubTool::new(config.timeout_secs)),
                Box::new(jira::JiraTool::new(config.timeout_secs)),
                Box::new(sheets::SheetsTool::new(config.timeout_secs)),
            ],
        }
    }

    pub fn with_tools(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.descriptor().name == name)
            .map(|t| t.as_ref())
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor()).collect()
    }

    /// name -> descriptor mapping for the listing endpoint.
    pub fn descriptor_map(&self) -> serde_json::Map<String, Value> {
        self.tools
            .iter()
            .map(|t| {
                let d = t.descriptor();
                (d.name.clone(), serde_json::to_value(&d).unwrap_or(Value::Null))
            })
            .collect()
    }
}
