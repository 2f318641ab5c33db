use actix_web::{get, post, web, HttpResponse, Result as WebResult};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::api::models::{ChatChoice, ChatCompletionResponse, ChatMessage, ChatRequest, ChatUsage};
use crate::config::AppConfig;
use crate::db::{service::UsageService, DbPool};
use crate::llm::models::ChatOptions;
use crate::orchestrator::Orchestrator;
use crate::tools::ToolRegistry;

// Internal detail stays in the server log; the client gets a generic body.
fn generic_failure() -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "request failed" }))
}

#[post("/chat")]
pub async fn chat_with_tools(
    config: web::Data<AppConfig>,
    pool: web::Data<DbPool>,
    orchestrator: web::Data<Orchestrator>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    // Quota gate runs before the orchestrator, for identified users only.
    // The lock is released before the slow network boundary below.
    if let Some(user_id) = &req.user_id {
        let conn = pool.lock().unwrap();
        match UsageService::check_limit(&conn, user_id, &config.limits) {
            Ok(status) if !status.can_proceed => {
                return Ok(HttpResponse::TooManyRequests().json(serde_json::json!({
                    "error": "daily request limit reached",
                    "remaining": status.remaining,
                })));
            }
            Ok(_) => {}
            Err(e) => {
                error!("Usage check failed for {}: {}", user_id, e);
                return Ok(generic_failure());
            }
        }
    }

    let options = ChatOptions {
        model: req.model,
        temperature: req.temperature,
        max_tokens: req.max_tokens,
    };

    let response = match orchestrator.run(&req.messages, options, &req.api_keys).await {
        Ok(res) => res,
        Err(e) => {
            error!("Orchestration failed: {}", e);
            return Ok(generic_failure());
        }
    };

    if let Some(user_id) = &req.user_id {
        let conn = pool.lock().unwrap();
        if let Err(e) = UsageService::record_usage(&conn, user_id) {
            // The answer is already paid for; losing one tick is preferable
            // to failing the request after the fact.
            error!("Failed to record usage for {}: {}", user_id, e);
        }
    }

    let usage = response.usage.map(|u| ChatUsage {
        prompt_tokens: u.input_tokens,
        completion_tokens: u.output_tokens,
        total_tokens: u.input_tokens + u.output_tokens,
    });

    let resp = ChatCompletionResponse {
        id: format!("chatcmpl-{}", Uuid::new_v4()),
        object: "chat.completion".to_string(),
        created: std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs(),
        model: response.model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage {
                role: "assistant".to_string(),
                content: response.content,
            },
            finish_reason: "stop".to_string(),
        }],
        usage,
    };

    Ok(HttpResponse::Ok().json(resp))
}

#[get("/tools")]
pub async fn list_tools(registry: web::Data<Arc<ToolRegistry>>) -> WebResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "tools": registry.descriptor_map() })))
}

#[get("/usage/{user_id}")]
pub async fn get_usage(
    config: web::Data<AppConfig>,
    pool: web::Data<DbPool>,
    user_id: web::Path<String>,
) -> WebResult<HttpResponse> {
    let conn = pool.lock().unwrap();

    match UsageService::check_limit(&conn, &user_id, &config.limits) {
        Ok(status) => Ok(HttpResponse::Ok().json(status)),
        Err(e) => {
            error!("Usage lookup failed for {}: {}", user_id, e);
            Ok(generic_failure())
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(chat_with_tools)
            .service(list_tools)
            .service(get_usage),
    );
}
