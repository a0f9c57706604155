//! End-to-end generation against a mock chat completions API

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use landgen::core::{ConfigResolver, DataSource, DataSourceKind, Settings, StoreScope};
use landgen::generation::{GenerationRequest, TwoStageGenerator};
use landgen::infrastructure::YamlCatalog;
use landgen::llm::{CompletionClient, HttpTransport};
use landgen::prompts::{EmbeddedTemplateStore, PromptAssembler};
use landgen::tools::{CATALOG_LOOKUP_TOOL, CatalogLookupTool, ToolRegistry};

const CATALOG: &str = r#"
stores:
  1: { name: Demo Store, base_url: "https://shop.example.com/", locale: en_US }
products:
  42: { sku: TEE-42, name: Linen Tee, price: 29.5 }
"#;

fn settings(api_base: &str) -> Settings {
    Settings::from_toml_str(&format!(
        r#"
api_base = "{api_base}"

[default]
api_key = "sk-or-test"
thinking_model = "planner/model"
rendering_model = "renderer/model"
generic_base_prompt = "Build a landing page."
product_base_prompt = "Sell this product."

[tools]
design = ["{CATALOG_LOOKUP_TOOL}"]
"#
    ))
    .unwrap()
}

fn generator(server: &MockServer) -> TwoStageGenerator {
    let settings = settings(&server.uri());
    let tools = settings.tools.clone();
    let config = ConfigResolver::new(Arc::new(settings));
    let catalog = Arc::new(YamlCatalog::from_yaml_str(CATALOG).unwrap());

    let registry = ToolRegistry::builder()
        .register(
            CATALOG_LOOKUP_TOOL,
            Arc::new(CatalogLookupTool::new(catalog.clone())),
        )
        .unwrap()
        .build();
    let transport = HttpTransport::new(server.uri()).unwrap();
    let completion = CompletionClient::new(Arc::new(transport), config.clone(), Arc::new(registry));

    TwoStageGenerator::new(
        Arc::new(completion),
        PromptAssembler::new(Arc::new(EmbeddedTemplateStore::new())),
        catalog,
        config,
    )
    .with_tools(tools)
}

fn content_response(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
}

fn tool_call_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "catalog_lookup",
                        "arguments": "{\"source_type\":\"product\",\"source_id\":\"42\"}"
                    }
                }]
            },
            "finish_reason": "tool_calls"
        }]
    }))
}

fn request_bodies(requests: &[wiremock::Request]) -> Vec<Value> {
    requests
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_generate_with_tool_call() {
    let server = MockServer::start().await;

    // design stage, after the tool result is in the conversation
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-or-test"))
        .and(body_partial_json(json!({"model": "planner/model"})))
        .and(body_string_contains("\"role\":\"tool\""))
        .respond_with(content_response("PLAN: hero with price badge"))
        .with_priority(1)
        .mount(&server)
        .await;

    // design stage, first turn
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "planner/model"})))
        .respond_with(tool_call_response())
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "renderer/model"})))
        .respond_with(content_response(
            "```html\n<section class=\"hero\">Linen Tee</section>\n```",
        ))
        .mount(&server)
        .await;

    let request = GenerationRequest::generate("Summer campaign", StoreScope(1))
        .with_data_source(DataSource::new(DataSourceKind::Product, "42"));
    let result = generator(&server).generate(&request).await.unwrap();

    assert_eq!(result.design.as_deref(), Some("PLAN: hero with price badge"));
    assert_eq!(result.html, "<section class=\"hero\">Linen Tee</section>");

    let bodies = request_bodies(&server.received_requests().await.unwrap());
    assert_eq!(bodies.len(), 3);

    // first design turn offers the tool
    assert_eq!(bodies[0]["tools"][0]["function"]["name"], "catalog_lookup");
    assert_eq!(bodies[0]["tool_choice"], "auto");

    // second design turn replays the assistant message and the tool result
    let messages = bodies[1]["messages"].as_array().unwrap();
    let assistant = &messages[messages.len() - 2];
    assert_eq!(assistant["role"], "assistant");
    assert_eq!(assistant["tool_calls"][0]["id"], "call_1");
    let tool = messages.last().unwrap();
    assert_eq!(tool["role"], "tool");
    assert_eq!(tool["tool_call_id"], "call_1");
    assert_eq!(tool["name"], "catalog_lookup");
    assert!(tool["content"].as_str().unwrap().contains("SKU: TEE-42"));

    // render stage gets the plan and no tools
    assert!(bodies[2].get("tools").is_none());
    let render_messages = bodies[2]["messages"].as_array().unwrap();
    assert!(
        render_messages
            .iter()
            .any(|m| m["content"] == "Technical Design Plan:\nPLAN: hero with price badge")
    );
    assert_eq!(
        render_messages.last().unwrap()["content"],
        "Content Goal: Sell this product."
    );
}

#[tokio::test]
async fn test_design_retries_without_tools_when_unsupported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"tools\""))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"message": "No endpoints found that support tool use", "code": 404}
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "planner/model"})))
        .respond_with(content_response("PLAN"))
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"model": "renderer/model"})))
        .respond_with(content_response("<div>ok</div>"))
        .with_priority(2)
        .mount(&server)
        .await;

    let request = GenerationRequest::generate("Landing page", StoreScope(1));
    let result = generator(&server).generate(&request).await.unwrap();

    assert_eq!(result.design.as_deref(), Some("PLAN"));
    assert_eq!(result.html, "<div>ok</div>");

    let bodies = request_bodies(&server.received_requests().await.unwrap());
    assert_eq!(bodies.len(), 3);
    assert!(bodies[0].get("tools").is_some());
    assert!(bodies[1].get("tools").is_none());
}

#[tokio::test]
async fn test_http_failure_becomes_soft_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let request = GenerationRequest::generate("Landing page", StoreScope(1));
    let result = generator(&server).generate(&request).await.unwrap();

    assert!(result.design.is_none());
    assert!(
        result
            .html
            .starts_with("Error generating design (Stage 1): Error communicating with API")
    );
    assert!(result.html.contains("HTTP Status 500"));
    assert!(result.html.contains("upstream exploded"));
}
