//! The production agent wired over HTTP: Groq's chat endpoint and Tavily
//! are both served by wiremock, so these tests exercise configuration,
//! client construction, the rig model adapter and the Tavily backend together.

use std::collections::HashMap;

use deepsearch_lib::{ConfigError, DeepSearchConfig, DefaultAgent, ResearchError};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_reply(text: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "llama-3.3-70b-versatile",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "logprobs": null,
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    })
}

fn config_for(vars: &[(&str, String)]) -> Result<DeepSearchConfig, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    DeepSearchConfig::from_lookup(|name| map.get(name).cloned())
}

async fn mount_groq(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_string_contains("search planner"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("q1, q2")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(body_string_contains("technical analyst"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_reply("REPORT [Source: https://e.com/1]")),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn request_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

#[tokio::test]
async fn test_default_agent_runs_over_http() {
    let groq = MockServer::start().await;
    let tavily = MockServer::start().await;
    mount_groq(&groq).await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("Authorization", "Bearer tavily-key"))
        .and(body_partial_json(json!({ "max_results": 1, "include_answer": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": null,
            "results": [
                { "title": "E", "url": "https://e.com/1", "content": "Example body" }
            ]
        })))
        .expect(2)
        .mount(&tavily)
        .await;

    let config = config_for(&[
        ("GROQ_API_KEY", "groq-key".to_string()),
        ("GROQ_BASE_URL", groq.uri()),
        ("TAVILY_API_KEY", "tavily-key".to_string()),
        ("TAVILY_ENDPOINT", format!("{}/search", tavily.uri())),
        ("DEEPSEARCH_QUERY_COUNT", "2".to_string()),
        ("DEEPSEARCH_MAX_RESULTS", "1".to_string()),
    ])
    .unwrap();

    let agent = DefaultAgent::from_config(&config).unwrap();
    let state = agent.run("example topic").await.unwrap();

    assert_eq!(state.plan, vec!["q1", "q2"]);
    assert_eq!(state.content.len(), 2);
    assert!(state.content[0].starts_with("[Source: https://e.com/1]\nTitle: E\n"));
    assert_eq!(state.final_report, "REPORT [Source: https://e.com/1]");
    assert!(state.citation_audit().is_clean());

    let bodies = request_bodies(&groq).await;
    assert_eq!(bodies.len(), 2);
    for body in &bodies {
        assert!(body.contains(r#""temperature":0.0"#), "body: {body}");
        assert!(body.contains(r#""role":"system""#), "body: {body}");
        assert!(body.contains("llama-3.3-70b-versatile"));
    }
    assert!(bodies[0].contains("generate 2 highly effective"));
    assert!(bodies[1].contains("Reference Materials"));
}

#[tokio::test]
async fn test_model_failure_stops_before_search() {
    let groq = MockServer::start().await;
    let tavily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tavily)
        .await;

    let config = config_for(&[
        ("GROQ_API_KEY", "groq-key".to_string()),
        ("GROQ_BASE_URL", groq.uri()),
        ("TAVILY_API_KEY", "tavily-key".to_string()),
        ("TAVILY_ENDPOINT", format!("{}/search", tavily.uri())),
    ])
    .unwrap();

    let agent = DefaultAgent::from_config(&config).unwrap();
    let err = agent.run("example topic").await.unwrap_err();

    assert!(matches!(err, ResearchError::Planning(_)));
    assert!(request_bodies(&tavily).await.is_empty());
}

#[tokio::test]
async fn test_missing_search_key_is_a_config_error() {
    let groq = MockServer::start().await;
    let tavily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("q")))
        .expect(0)
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tavily)
        .await;

    let result = config_for(&[
        ("GROQ_API_KEY", "groq-key".to_string()),
        ("GROQ_BASE_URL", groq.uri()),
        ("TAVILY_ENDPOINT", format!("{}/search", tavily.uri())),
    ])
    .map_err(ResearchError::from)
    .and_then(|config| DefaultAgent::from_config(&config));

    match result {
        Err(ResearchError::Config(ConfigError::MissingApiKey { provider, env_vars })) => {
            assert_eq!(provider, "Tavily");
            assert_eq!(env_vars, vec!["TAVILY_API_KEY".to_string()]);
        }
        Err(other) => panic!("Expected missing Tavily key, got {other}"),
        Ok(_) => panic!("configuration should have failed"),
    }

    assert!(request_bodies(&groq).await.is_empty());
    assert!(request_bodies(&tavily).await.is_empty());
}

#[tokio::test]
#[serial_test::serial]
async fn test_from_env_without_search_key_sends_nothing() {
    let groq = MockServer::start().await;
    let tavily = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("q")))
        .expect(0)
        .mount(&groq)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&tavily)
        .await;

    unsafe {
        std::env::set_var("GROQ_API_KEY", "groq-key");
        std::env::set_var("GROQ_BASE_URL", groq.uri());
        std::env::set_var("TAVILY_ENDPOINT", format!("{}/search", tavily.uri()));
        std::env::remove_var("TAVILY_API_KEY");
        std::env::remove_var("DEEPSEARCH_SEARCH_PROVIDER");
    }

    let result = DefaultAgent::from_env();

    unsafe {
        std::env::remove_var("GROQ_API_KEY");
        std::env::remove_var("GROQ_BASE_URL");
        std::env::remove_var("TAVILY_ENDPOINT");
    }

    let err = result.map(|_| ()).unwrap_err();
    assert!(err.is_config());
    assert!(err.to_string().contains("TAVILY_API_KEY"));
    assert!(request_bodies(&groq).await.is_empty());
    assert!(request_bodies(&tavily).await.is_empty());
}
