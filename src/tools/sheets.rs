use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::tools::{ApiKeyBundle, Tool, ToolDescriptor, ToolError};

pub struct SheetsTool {
    client: Client,
}

#[derive(Deserialize)]
struct SheetsArguments {
    spreadsheet_id: String,
    range: String,
}

impl SheetsTool {
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
impl Tool for SheetsTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "read_google_sheet".to_string(),
            description: "Read a cell range from a Google Sheets spreadsheet.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "spreadsheet_id": {
                        "type": "string",
                        "description": "The spreadsheet ID from the sheet URL."
                    },
                    "range": {
                        "type": "string",
                        "description": "An A1-notation range, e.g. 'Sheet1!A1:D10'."
                    }
                },
                "required": ["spreadsheet_id", "range"]
            }),
        }
    }

    async fn call(&self, parameters: &Value, keys: &ApiKeyBundle) -> Result<Value, ToolError> {
        let args: SheetsArguments = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let token = keys
            .google_sheets
            .as_deref()
            .ok_or(ToolError::MissingCredential("googleSheets"))?;

        info!("Reading Google Sheet {} range {}", args.spreadsheet_id, args.range);

        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
            args.spreadsheet_id,
            urlencoding::encode(&args.range)
        );

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", token))
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
