use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::tools::{ApiKeyBundle, Tool, ToolDescriptor, ToolError};

pub struct FigmaTool {
    client: Client,
}

#[derive(Deserialize)]
struct FigmaArguments {
    file_key: String,
}

impl FigmaTool {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap(),
        }
    }
}

#[async_trait]
impl Tool for FigmaTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_figma_file".to_string(),
            description: "Fetch a Figma file's document tree and metadata by its file key.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_key": {
                        "type": "string",
                        "description": "The Figma file key from the file URL."
                    }
                },
                "required": ["file_key"]
            }),
        }
    }

    async fn call(&self, parameters: &Value, keys: &ApiKeyBundle) -> Result<Value, ToolError> {
        let args: FigmaArguments = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let token = keys.figma.as_deref().ok_or(ToolError::MissingCredential("figma"))?;

        info!("Fetching Figma file {}", args.file_key);

        let response = self
            .client
            .get(format!("https://api.figma.com/v1/files/{}", args.file_key))
            .header("X-Figma-Token", token)
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
