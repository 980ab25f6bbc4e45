//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! One request per line on stdin, one response per line on stdout. Requests without
//! an `id` are notifications and get no response. Logs go to stderr so stdout stays
//! machine-readable.
//!
//! Methods:
//! - `recommend` `{context, top_k?}` -> ranked recommendations
//! - `feedback` `{context, model_id, reward}` -> `{applied: true}`
//! - `catalog` -> model ids in action order
//! - `ping` -> `{}`
//! - `shutdown` -> `{}` and the loop ends

use std::io::{self, BufRead, Write};

use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::app::AppContext;
use crate::error::{RecError, Result};
use crate::recommender::{Context, Recommender};

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Default number of models returned by `recommend`
    #[arg(long)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }

    fn from_rec_error(id: Option<Value>, err: &RecError) -> Self {
        let code = match err {
            RecError::InvalidArgument(_) | RecError::NotFound(_) => INVALID_PARAMS,
            _ => INTERNAL_ERROR,
        };
        Self::error(
            id,
            code,
            err.to_string(),
            Some(serde_json::json!({ "code": err.code() })),
        )
    }
}

// JSON-RPC 2.0 error codes
const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Deserialize)]
struct RecommendParams {
    #[serde(default)]
    context: Option<Value>,
    top_k: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct FeedbackParams {
    #[serde(default)]
    context: Option<Value>,
    model_id: String,
    reward: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Server<'a> {
    recommender: &'a Recommender,
    top_k: usize,
}

pub fn run(ctx: &AppContext, args: &ServeArgs) -> Result<()> {
    let recommender = ctx.open_recommender()?;
    let server = Server {
        recommender: &recommender,
        top_k: args.top_k.unwrap_or(ctx.config.serve.top_k),
    };
    info!(top_k = server.top_k, "serving JSON-RPC on stdio");
    let stdin = io::stdin();
    server.serve(stdin.lock(), io::stdout())
}

impl Server<'_> {
    fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!(error = %e, "stdin read error");
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }
            debug!(request = %line, "<-");

            let (response, flow) = self.handle_line(&line);
            if let Some(response) = response {
                let payload = serialize_response(&response);
                debug!(response = %payload, "->");
                writeln!(writer, "{payload}")?;
                writer.flush()?;
            }
            if flow == Flow::Stop {
                break;
            }
        }

        info!("server shutting down");
        Ok(())
    }

    fn handle_line(&self, line: &str) -> (Option<JsonRpcResponse>, Flow) {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return (
                    Some(JsonRpcResponse::error(
                        None,
                        PARSE_ERROR,
                        format!("Parse error: {e}"),
                        None,
                    )),
                    Flow::Continue,
                );
            }
        };

        if request.jsonrpc != "2.0" {
            return (
                Some(JsonRpcResponse::error(
                    request.id,
                    INVALID_REQUEST,
                    "Invalid JSON-RPC version".to_string(),
                    None,
                )),
                Flow::Continue,
            );
        }

        let flow = if request.method == "shutdown" {
            Flow::Stop
        } else {
            Flow::Continue
        };
        let result = match request.method.as_str() {
            "recommend" => self.recommend(request.params),
            "feedback" => self.feedback(request.params),
            "catalog" => Ok(self.catalog()),
            "ping" | "shutdown" => Ok(serde_json::json!({})),
            _ => {
                let response = JsonRpcResponse::error(
                    request.id.clone(),
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                    None,
                );
                return (request.id.is_some().then_some(response), flow);
            }
        };

        // Notifications are executed but never answered.
        let Some(id) = request.id else {
            if let Err(err) = result {
                warn!(method = %request.method, error = %err, "notification failed");
            }
            return (None, flow);
        };
        let response = match result {
            Ok(value) => JsonRpcResponse::success(Some(id), value),
            Err(err) => JsonRpcResponse::from_rec_error(Some(id), &err),
        };
        (Some(response), flow)
    }

    fn recommend(&self, params: Value) -> Result<Value> {
        let params: RecommendParams = parse_params(params)?;
        let context = context_from(params.context)?;
        let ranked = self
            .recommender
            .recommend(&context, params.top_k.unwrap_or(self.top_k))?;
        Ok(serde_json::json!({ "recommendations": ranked }))
    }

    fn feedback(&self, params: Value) -> Result<Value> {
        let params: FeedbackParams = parse_params(params)?;
        let context = context_from(params.context)?;
        self.recommender
            .feedback(&context, &params.model_id, params.reward)?;
        Ok(serde_json::json!({ "applied": true }))
    }

    fn catalog(&self) -> Value {
        let catalog = self.recommender.catalog();
        let ids: Vec<_> = (0..catalog.count()).filter_map(|i| catalog.id_of(i)).collect();
        serde_json::json!({ "models": ids })
    }
}

fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T> {
    serde_json::from_value(params)
        .map_err(|err| RecError::InvalidArgument(format!("invalid params: {err}")))
}

fn context_from(value: Option<Value>) -> Result<Context> {
    value.map_or_else(|| Ok(Context::default()), Context::from_value)
}

fn serialize_response(response: &JsonRpcResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| {
        warn!("failed to serialize JSON-RPC response: {e}");
        r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Serialization failed"}}"#
            .to_string()
    })
}
