// End-to-end enrichment flow against mock provider endpoints: ranked
// fallback, shape validation, and the no-network guarantees.

use httpmock::prelude::*;
use serde_json::json;

use tabula_engine::column::{Column, ColumnType};
use tabula_engine::row::Row;

use tabula_enrich::client::{EnrichClient, EnrichError, EnrichRequest};
use tabula_enrich::provider::{AnthropicProvider, OpenAiProvider, Provider};

fn request(row_count: usize) -> EnrichRequest {
    let columns = vec![
        Column::new("name", "Name", ColumnType::Text),
        Column::new("city", "City", ColumnType::Text),
    ];
    let rows: Vec<Row> = (0..row_count)
        .map(|i| {
            let mut r = Row::empty(i as i64 + 1, &columns);
            r.set("name", format!("Person {i}"));
            r.set("city", "Paris");
            r
        })
        .collect();
    EnrichRequest {
        prompt: "a fitting motto".to_string(),
        rows,
        columns,
        target_column_id: "motto".to_string(),
    }
}

fn openai_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

fn anthropic_body(text: &str) -> serde_json::Value {
    json!({
        "content": [
            { "type": "text", "text": text }
        ]
    })
}

#[test]
fn primary_success_never_reaches_secondary() {
    let primary = MockServer::start();
    let secondary = MockServer::start();

    let primary_mock = primary.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(openai_body(r#"["liberté", "égalité"]"#));
    });
    let secondary_mock = secondary.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200).json_body(anthropic_body("[]"));
    });

    let client = EnrichClient::new(vec![
        Box::new(OpenAiProvider::with_base_url("k1", "test-model", primary.base_url())),
        Box::new(AnthropicProvider::with_base_url("k2", "test-model", secondary.base_url())),
    ]);

    let values = client.enrich(&request(2)).unwrap();
    assert_eq!(values, vec![json!("liberté"), json!("égalité")]);
    primary_mock.assert_hits(1);
    secondary_mock.assert_hits(0);
}

#[test]
fn primary_http_error_falls_back_to_secondary() {
    let primary = MockServer::start();
    let secondary = MockServer::start();

    let primary_mock = primary.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(500).body("upstream exploded");
    });
    let secondary_mock = secondary.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200)
            .json_body(anthropic_body("Here you go:\n[\"a\", \"b\"]"));
    });

    let client = EnrichClient::new(vec![
        Box::new(OpenAiProvider::with_base_url("k1", "m", primary.base_url())),
        Box::new(AnthropicProvider::with_base_url("k2", "m", secondary.base_url())),
    ]);

    let values = client.enrich(&request(2)).unwrap();
    assert_eq!(values.len(), 2);
    primary_mock.assert_hits(1);
    secondary_mock.assert_hits(1);
}

#[test]
fn primary_without_array_falls_back() {
    let primary = MockServer::start();
    let secondary = MockServer::start();

    primary.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .json_body(openai_body("Sorry, I can't produce that."));
    });
    let secondary_mock = secondary.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200).json_body(anthropic_body(r#"["x"]"#));
    });

    let client = EnrichClient::new(vec![
        Box::new(OpenAiProvider::with_base_url("k1", "m", primary.base_url())),
        Box::new(AnthropicProvider::with_base_url("k2", "m", secondary.base_url())),
    ]);

    assert_eq!(client.enrich(&request(1)).unwrap(), vec![json!("x")]);
    secondary_mock.assert_hits(1);
}

#[test]
fn wrong_length_from_both_is_invalid_output() {
    let primary = MockServer::start();
    let secondary = MockServer::start();

    let primary_mock = primary.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(openai_body(r#"["one"]"#));
    });
    let secondary_mock = secondary.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200)
            .json_body(anthropic_body(r#"["one", "two", "three"]"#));
    });

    let client = EnrichClient::new(vec![
        Box::new(OpenAiProvider::with_base_url("k1", "m", primary.base_url())),
        Box::new(AnthropicProvider::with_base_url("k2", "m", secondary.base_url())),
    ]);

    // Two rows in, never two values out: both providers are tried, then fail
    assert_eq!(client.enrich(&request(2)), Err(EnrichError::InvalidOutput));
    primary_mock.assert_hits(1);
    secondary_mock.assert_hits(1);
}

#[test]
fn validation_failures_make_no_network_calls() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(openai_body("[]"));
    });

    let client = EnrichClient::new(vec![Box::new(OpenAiProvider::with_base_url(
        "k",
        "m",
        server.base_url(),
    ))]);

    let mut no_rows = request(1);
    no_rows.rows.clear();
    assert_eq!(client.enrich(&no_rows), Err(EnrichError::NoRows));

    let mut blank_prompt = request(1);
    blank_prompt.prompt = " ".to_string();
    assert_eq!(client.enrich(&blank_prompt), Err(EnrichError::MissingFields));

    let mut no_target = request(1);
    no_target.target_column_id = String::new();
    assert_eq!(client.enrich(&no_target), Err(EnrichError::MissingFields));

    mock.assert_hits(0);
}

#[test]
fn openai_request_carries_system_and_user_messages() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("authorization", "Bearer secret-key")
            .body_includes("\"role\":\"system\"")
            .body_includes("\"role\":\"user\"")
            .body_includes("a fitting motto");
        then.status(200).json_body(openai_body(r#"["v"]"#));
    });

    let client = EnrichClient::new(vec![Box::new(OpenAiProvider::with_base_url(
        "secret-key",
        "test-model",
        server.base_url(),
    ))]);

    client.enrich(&request(1)).unwrap();
    mock.assert_hits(1);
}

#[test]
fn anthropic_request_is_one_combined_message() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/messages")
            .header("x-api-key", "secret-key")
            .header("anthropic-version", "2023-06-01")
            .body_includes("\"role\":\"user\"")
            // Instruction and data travel in the same message
            .body_includes("a fitting motto")
            .body_includes("Input data (array of objects)");
        then.status(200).json_body(anthropic_body(r#"["v"]"#));
    });

    let client = EnrichClient::new(vec![Box::new(AnthropicProvider::with_base_url(
        "secret-key",
        "test-model",
        server.base_url(),
    ))]);

    client.enrich(&request(1)).unwrap();
    mock.assert_hits(1);
}

#[test]
fn provider_complete_surfaces_http_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429)
            .json_body(json!({ "error": { "message": "rate limited" } }));
    });

    let provider = OpenAiProvider::with_base_url("k", "m", server.base_url());
    let err = provider.complete("s", "u").unwrap_err();
    match err {
        tabula_enrich::provider::ProviderError::Http { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}
