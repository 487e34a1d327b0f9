use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::error::{Result, TimeQueryError};
use crate::service::{AbsoluteParams, QueryParams, TimeService};

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    code: i32,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub async fn run_stdio(service: Arc<TimeService>) -> Result<()> {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = reader.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let req: RpcRequest = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                write_response(
                    &mut stdout,
                    RpcResponse {
                        jsonrpc: "2.0",
                        id: Value::Null,
                        result: None,
                        error: Some(RpcError {
                            code: -32700,
                            message: format!("parse error: {e}"),
                        }),
                    },
                )
                .await?;
                continue;
            }
        };

        if let Some(resp) = process_request(&service, req) {
            write_response(&mut stdout, resp).await?;
        }
    }

    Ok(())
}

/// 处理单个 JSON-RPC 请求。通知（无 id）返回 `None`。
pub fn process_request(service: &TimeService, req: RpcRequest) -> Option<RpcResponse> {
    debug!(method = %req.method, "rpc request");
    let resp = match req.method.as_str() {
        "initialize" => ok(&req, initialize_result()),
        "notifications/initialized" => {
            if req.id.is_null() {
                return None;
            }
            ok(&req, Value::Bool(true))
        }
        "tools/list" | "list_tools" => ok(&req, json!({ "tools": tool_definitions() })),
        "tools/call" => handle_tool_call(service, &req),
        "analyze_time_query" | "resolve_time_range" | "parse_absolute_time" | "time_aware_prompt" => {
            match call_tool(service, &req.method, &req.params) {
                Ok(v) => ok(&req, v),
                Err(e) => rpc_error(&req, -32602, e.to_string()),
            }
        }
        _ => rpc_error(&req, -32601, format!("method not found: {}", req.method)),
    };
    Some(resp)
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn handle_tool_call(service: &TimeService, req: &RpcRequest) -> RpcResponse {
    let params: ToolCallParams = match serde_json::from_value(req.params.clone()) {
        Ok(p) => p,
        Err(e) => return rpc_error(req, -32602, format!("invalid params: {e}")),
    };

    match call_tool(service, &params.name, &params.arguments) {
        Ok(value) => {
            let text = serde_json::to_string_pretty(&value).unwrap_or_default();
            ok(
                req,
                json!({
                    "content": [{ "type": "text", "text": text }],
                    "structuredContent": value,
                    "isError": false
                }),
            )
        }
        Err(TimeQueryError::InvalidRequest(msg)) if msg.starts_with("unknown tool") => {
            rpc_error(req, -32601, msg)
        }
        Err(e) => {
            warn!(tool = %params.name, error = %e, "tool call rejected");
            rpc_error(req, -32602, e.to_string())
        }
    }
}

fn call_tool(service: &TimeService, name: &str, args: &Value) -> Result<Value> {
    let value = match name {
        "analyze_time_query" => {
            let p: QueryParams = parse_args(args)?;
            serde_json::to_value(service.analyze(&p.query))
        }
        "resolve_time_range" => {
            let p: QueryParams = parse_args(args)?;
            serde_json::to_value(service.resolve(&p.query))
        }
        "parse_absolute_time" => {
            let p: AbsoluteParams = parse_args(args)?;
            serde_json::to_value(service.absolute(&p.start, &p.end))
        }
        "time_aware_prompt" => {
            let p: QueryParams = parse_args(args)?;
            serde_json::to_value(service.prompt(&p.query))
        }
        other => return Err(TimeQueryError::InvalidRequest(format!("unknown tool: {other}"))),
    };
    value.map_err(|e| TimeQueryError::InvalidRequest(format!("serialize result failed: {e}")))
}

fn parse_args<T: serde::de::DeserializeOwned>(args: &Value) -> Result<T> {
    serde_json::from_value(args.clone())
        .map_err(|e| TimeQueryError::InvalidRequest(format!("invalid params: {e}")))
}

async fn write_response(stdout: &mut tokio::io::Stdout, resp: RpcResponse) -> Result<()> {
    let line = serde_json::to_string(&resp).unwrap_or_else(|_| "{}".to_string());
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

fn ok(req: &RpcRequest, result: Value) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0",
        id: req.id.clone(),
        result: Some(result),
        error: None,
    }
}

fn rpc_error(req: &RpcRequest, code: i32, message: String) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0",
        id: req.id.clone(),
        result: None,
        error: Some(RpcError { code, message }),
    }
}

fn tool_definitions() -> Vec<Value> {
    let query_schema = json!({
        "type": "object",
        "required": ["query"],
        "properties": {
            "query": { "type": "string" }
        }
    });
    vec![
        json!({
            "name": "analyze_time_query",
            "description": "Detect a relative time expression (e.g. '過去24小時', 'past 7 days', '昨天') in a search query and return the backend time range, or suggestions when none is found.",
            "inputSchema": query_schema.clone()
        }),
        json!({
            "name": "resolve_time_range",
            "description": "Like analyze_time_query, but first tries to split the query on '到'/'to' into an absolute start/end range.",
            "inputSchema": query_schema.clone()
        }),
        json!({
            "name": "parse_absolute_time",
            "description": "Parse a start and end date/time (YYYY-MM-DD[ HH:MM[:SS]], YYYY/MM/DD..., MM-DD..., MM/DD...) into an absolute ISO-8601 range.",
            "inputSchema": {
                "type": "object",
                "required": ["start", "end"],
                "properties": {
                    "start": { "type": "string" },
                    "end": { "type": "string" }
                }
            }
        }),
        json!({
            "name": "time_aware_prompt",
            "description": "Render the time analysis of a query as an instruction block for a language model.",
            "inputSchema": query_schema
        }),
    ]
}
