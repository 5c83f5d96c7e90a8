use log::{debug, info};
use serde_json::{json, Value};

use super::jsonrpc::{
    json_rpc_error, json_rpc_response, JsonRpcRequest, INVALID_PARAMS, METHOD_NOT_FOUND,
};
use super::tools::{call_tool, tool_definitions};
use crate::jenkins::JenkinsClient;

pub const MCP_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "jenkins-mcp-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request handler for one MCP session.
pub struct McpServer {
    client: JenkinsClient,
}

impl McpServer {
    pub fn new(client: JenkinsClient) -> Self {
        Self { client }
    }

    /// Handle one request. Returns `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<Value> {
        let expects_response = request.expects_response();
        debug!("<- {}", request.method);

        match request.method.as_str() {
            "initialize" => {
                // Echo the client's protocol version back when it sent one.
                let protocol_version = request
                    .params
                    .as_ref()
                    .and_then(|v| v.get("protocolVersion"))
                    .and_then(Value::as_str)
                    .unwrap_or(MCP_VERSION);
                info!("Client initialized with protocol {protocol_version}");

                Some(json_rpc_response(
                    request.id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": { "name": SERVER_NAME, "version": SERVER_VERSION },
                        "capabilities": { "tools": {} }
                    }),
                ))
            }
            "notifications/initialized" | "initialized" => None,
            "ping" => Some(json_rpc_response(request.id, json!({}))),
            "tools/list" => Some(json_rpc_response(
                request.id,
                json!({ "tools": tool_definitions() }),
            )),
            "tools/call" => Some(self.handle_tool_call(request.id, request.params).await),
            _ if !expects_response => None,
            method => Some(json_rpc_error(
                request.id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {method}"),
            )),
        }
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> Value {
        let Some(params) = params.as_ref().and_then(Value::as_object) else {
            return json_rpc_error(id, INVALID_PARAMS, "params must be an object");
        };

        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return json_rpc_error(id, INVALID_PARAMS, "params.name must be a string");
        };

        // Some clients send `"arguments": null` for tools without required fields.
        let args = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(v) => v.clone(),
        };

        let output = call_tool(&self.client, name, args).await;
        json_rpc_response(id, output.to_result())
    }
}
