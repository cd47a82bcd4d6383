mod common;
use common::{Reply, StubServer};

use serde_json::{json, Value};
use sourcesync_mcp::app::App;
use sourcesync_mcp::mcp::server::McpServer;
use sourcesync_mcp::services::settings::Settings;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

fn server(url: &str) -> McpServer {
    let settings = Settings::new(url)
        .unwrap()
        .with_api_key("sk_test")
        .with_namespace_id("ns_1");
    McpServer::new(Arc::new(App::with_settings(settings).unwrap()))
}

async fn call(server: &McpServer, message: Value) -> Value {
    let response = server
        .handle_line(&message.to_string())
        .await
        .expect("a response");
    serde_json::to_value(response).unwrap()
}

fn tool_text(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content");
    serde_json::from_str(text).expect("json text")
}

#[tokio::test]
async fn initialize_reports_server_info() {
    let s = server("http://127.0.0.1:9");
    let out = call(
        &s,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
    )
    .await;
    assert_eq!(out["id"], 1);
    assert_eq!(out["result"]["serverInfo"]["name"], "SourceSyncAI");
    assert!(out["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn notifications_get_no_reply() {
    let s = server("http://127.0.0.1:9");
    let line = json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string();
    assert!(s.handle_line(&line).await.is_none());
}

#[tokio::test]
async fn protocol_errors_use_json_rpc_codes() {
    let s = server("http://127.0.0.1:9");

    let parse = serde_json::to_value(s.handle_line("{not json").await.unwrap()).unwrap();
    assert_eq!(parse["error"]["code"], -32700);
    assert_eq!(parse["id"], Value::Null);

    let invalid = call(&s, json!({"jsonrpc": "2.0", "id": 2})).await;
    assert_eq!(invalid["error"]["code"], -32600);
    assert_eq!(invalid["id"], 2);

    let unknown_method =
        call(&s, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
    assert_eq!(unknown_method["error"]["code"], -32601);
}

#[tokio::test]
async fn tools_list_exposes_the_catalog() {
    let s = server("http://127.0.0.1:9");
    let out = call(&s, json!({"jsonrpc": "2.0", "id": "l", "method": "tools/list"})).await;
    let tools = out["result"]["tools"].as_array().expect("tools");
    assert_eq!(tools.len(), 25);
    let search = tools
        .iter()
        .find(|t| t["name"] == "semanticSearch")
        .expect("semanticSearch listed");
    assert_eq!(search["inputSchema"]["required"], json!(["query"]));
}

#[tokio::test]
async fn tool_call_relays_the_remote_body() {
    let body = json!({"success": true, "data": {"results": [{"score": 0.9}]}});
    let stub = StubServer::reply_with(Reply::json(200, body.clone())).await;
    let s = server(&stub.url);

    let out = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 7,
            "method": "tools/call",
            "params": {"name": "semanticSearch", "arguments": {"query": "refunds", "topK": 3}}
        }),
    )
    .await;

    assert!(out["result"].get("isError").is_none());
    assert_eq!(tool_text(&out), body);

    let requests = stub.requests().await;
    assert_eq!(requests[0].target, "/v1/search");
    assert_eq!(
        requests[0].json(),
        json!({"query": "refunds", "topK": 3, "namespaceId": "ns_1", "searchType": "SEMANTIC"})
    );
}

#[tokio::test]
async fn remote_failures_become_error_results() {
    let stub = StubServer::reply_with(Reply::json(401, json!({"message": "bad key"}))).await;
    let s = server(&stub.url);

    let out = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 8,
            "method": "tools/call",
            "params": {"name": "listNamespaces", "arguments": {}}
        }),
    )
    .await;

    assert!(out.get("error").is_none());
    assert_eq!(out["result"]["isError"], true);
    let record = tool_text(&out);
    assert_eq!(record["kind"], "api");
    assert_eq!(record["status"], 401);
    assert_eq!(record["error"]["message"], "bad key");
}

#[tokio::test]
async fn validate_api_key_answers_instead_of_failing_on_401() {
    let stub = StubServer::reply_with(Reply::json(401, json!({"message": "bad key"}))).await;
    let s = server(&stub.url);

    let out = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 9,
            "method": "tools/call",
            "params": {"name": "validateApiKey", "arguments": {"apiKey": "sk_wrong"}}
        }),
    )
    .await;

    let text = tool_text(&out);
    assert_eq!(text["valid"], false);
    assert_eq!(text["error"]["status"], 401);
    assert_eq!(
        stub.requests().await[0].header("authorization"),
        Some("Bearer sk_wrong")
    );
}

#[tokio::test]
async fn schema_violations_and_unknown_tools_are_invalid_params() {
    let s = server("http://127.0.0.1:9");

    let bad_args = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 10,
            "method": "tools/call",
            "params": {"name": "getConnection", "arguments": {"connection_id": "c1"}}
        }),
    )
    .await;
    assert_eq!(bad_args["error"]["code"], -32602);
    let message = bad_args["error"]["message"].as_str().unwrap();
    assert!(message.contains("missing required field 'connectionId'"));
    assert!(message.contains("connectionId"));

    let unknown = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 11,
            "method": "tools/call",
            "params": {"name": "semanticSerch", "arguments": {}}
        }),
    )
    .await;
    assert_eq!(unknown["error"]["code"], -32602);
    assert!(unknown["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Did you mean: semanticSearch?"));
}

#[tokio::test]
async fn bulk_document_calls_need_a_filter_before_any_request() {
    let stub = StubServer::reply_with(Reply::json(200, json!({"success": true}))).await;
    let s = server(&stub.url);

    let no_args = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 12,
            "method": "tools/call",
            "params": {"name": "deleteDocuments", "arguments": {}}
        }),
    )
    .await;
    assert_eq!(no_args["error"]["code"], -32602);

    let empty_filter = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 13,
            "method": "tools/call",
            "params": {"name": "resyncDocuments", "arguments": {"filterConfig": {}}}
        }),
    )
    .await;
    assert_eq!(empty_filter["result"]["isError"], true);
    assert_eq!(tool_text(&empty_filter)["kind"], "invalid_params");

    assert!(stub.requests().await.is_empty());
}

#[tokio::test]
async fn document_listings_are_flattened() {
    let stub = StubServer::reply_with(Reply::json(
        200,
        json!({
            "success": true,
            "data": {
                "documents": [{"id": "d1"}, {"id": "d2"}],
                "hasNextPage": false,
                "nextCursor": null,
                "statsBySource": {"TEXT": 2}
            }
        }),
    ))
    .await;
    let s = server(&stub.url);

    let out = call(
        &s,
        json!({
            "jsonrpc": "2.0",
            "id": 14,
            "method": "tools/call",
            "params": {"name": "getDocuments", "arguments": {"documentIds": ["d1", "d2"]}}
        }),
    )
    .await;

    assert_eq!(
        tool_text(&out),
        json!({
            "data": [{"id": "d1"}, {"id": "d2"}],
            "hasNextPage": false,
            "nextCursor": null,
            "statsBySource": {"TEXT": 2}
        })
    );
    assert_eq!(stub.requests().await[0].target, "/v1/documents");
}

#[tokio::test]
async fn serve_answers_each_line_over_a_stream() {
    let s = Arc::new(server("http://127.0.0.1:9"));
    let (client, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);
    let serving = tokio::spawn(s.serve(server_read, server_write));

    let (client_read, mut client_write) = tokio::io::split(client);
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}).to_string(),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string(),
    ]
    .join("\n");
    client_write.write_all(input.as_bytes()).await.unwrap();
    client_write.write_all(b"\n").await.unwrap();
    client_write.shutdown().await.unwrap();

    let mut lines = BufReader::new(client_read).lines();
    let mut ids = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        let value: Value = serde_json::from_str(&line).unwrap();
        ids.push(value["id"].as_i64().unwrap());
    }
    ids.sort();
    assert_eq!(ids, vec![1, 2]);
    serving.await.unwrap().unwrap();
}
