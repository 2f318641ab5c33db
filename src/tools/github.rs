use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::tools::{ApiKeyBundle, Tool, ToolDescriptor, ToolError};

pub struct GithubTool {
    client: Client,
}

#[derive(Deserialize)]
struct GithubArguments {
    query: String,
}

impl GithubTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            // GitHub rejects requests without a User-Agent
            client: Client::builder()
                .user_agent("timeai/0.3")
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl Tool for GithubTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_github_repos".to_string(),
            description: "Search GitHub repositories by keyword.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The repository search query."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, parameters: &Value, keys: &ApiKeyBundle) -> Result<Value, ToolError> {
        let args: GithubArguments = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let token = keys.github.as_deref().ok_or(ToolError::MissingCredential("github"))?;

        info!("Searching GitHub repositories for: {}", args.query);

        let url = format!(
            "https://api.github.com/search/repositories?q={}",
            urlencoding::encode(&args.query)
        );

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api { status, body });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))
    }
}
