//! Yelp client tests against a mock Fusion API

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use beauty_agent_common::YelpConfig;
use beauty_agent_network::{BusinessDirectory, YelpClient};

fn config_for(server: &MockServer) -> YelpConfig {
    YelpConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        default_location: "San Francisco, CA".to_string(),
        default_limit: 10,
    }
}

#[tokio::test]
async fn search_parses_business_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .and(header("authorization", "Bearer test-key"))
        .and(query_param("term", "day spa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "businesses": [{
                "id": "glow-spa",
                "name": "Glow Spa",
                "rating": 4.5,
                "review_count": 321,
                "price": "$$",
                "location": {"display_address": ["123 Mission St", "San Francisco, CA 94103"]},
                "display_phone": "(415) 555-0100",
                "categories": [{"title": "Day Spa"}, {"title": "Skin Care"}],
                "url": "https://yelp.example/glow-spa"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = YelpClient::new(&config_for(&server)).unwrap();
    let businesses = client.search("day spa", "San Francisco, CA", 5).await.unwrap();

    assert_eq!(businesses.len(), 1);
    let spa = &businesses[0];
    assert_eq!(spa.name, "Glow Spa");
    assert_eq!(spa.categories, vec!["Day Spa", "Skin Care"]);
    assert_eq!(spa.address, "123 Mission St, San Francisco, CA 94103");
    assert_eq!(spa.phone.as_deref(), Some("(415) 555-0100"));
    assert!(spa.summary().contains("4.5 stars"));
}

#[tokio::test]
async fn non_success_status_is_a_business_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/businesses/search"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = YelpClient::new(&config_for(&server)).unwrap();
    let err = client
        .search("day spa", "San Francisco, CA", 5)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Business search error"));
}

#[test]
fn missing_api_key_is_a_config_error() {
    let config = YelpConfig {
        api_key: None,
        ..YelpConfig::default()
    };
    assert!(YelpClient::new(&config).is_err());
}
