use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;

use crate::tools::{ApiKeyBundle, Tool, ToolDescriptor, ToolError};

pub struct JiraTool {
    client: Client,
}

#[derive(Deserialize)]
struct JiraArguments {
    jql: String,
}

impl JiraTool {
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
impl Tool for JiraTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "search_jira_issues".to_string(),
            description: "Search Jira issues with a JQL query on the caller's Jira site.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "jql": {
                        "type": "string",
                        "description": "A JQL query, e.g. 'project = TIME AND status = \"In Progress\"'."
                    }
                },
                "required": ["jql"]
            }),
        }
    }

    async fn call(&self, parameters: &Value, keys: &ApiKeyBundle) -> Result<Value, ToolError> {
        let args: JiraArguments = serde_json::from_value(parameters.clone())
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        // Jira Cloud needs all three: site domain, account email, API token
        let domain = keys.jira_domain.as_deref().ok_or(ToolError::MissingCredential("jiraDomain"))?;
        let email = keys.jira_email.as_deref().ok_or(ToolError::MissingCredential("jiraEmail"))?;
        let token = keys.jira_token.as_deref().ok_or(ToolError::MissingCredential("jiraToken"))?;

        info!("Searching Jira issues on {} with JQL: {}", domain, args.jql);

        let url = format!(
            "https://{}/rest/api/3/search?jql={}",
            domain,
            urlencoding::encode(&args.jql)
        );

        let response = self
            .client
            .get(url)
            .basic_auth(email, Some(token))
            .header("Accept", "application/json")
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
