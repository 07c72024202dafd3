//! Integration tests for the relay between the radar tool and an agent.

use async_trait::async_trait;
use radar_core::{
    AgentSettings, NowcastAgent, RadarImageFetcher, RadarImageResult, RadarRequest, Relay,
    StaticStationResolver,
};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Default, Clone)]
struct RecordingAgent {
    seen: Arc<Mutex<Vec<(String, RadarImageResult)>>>,
    fail: bool,
}

#[async_trait]
impl NowcastAgent for RecordingAgent {
    async fn nowcast(
        &self,
        settings: &AgentSettings,
        result: &RadarImageResult,
    ) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push((settings.model.clone(), result.clone()));
        if self.fail {
            anyhow::bail!("model unavailable");
        }
        Ok(match result {
            RadarImageResult::Success(_) => "Light Rain Nearby".to_string(),
            RadarImageResult::Error { .. } => "No radar right now".to_string(),
        })
    }
}

async fn radar_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ridge/standard/KOKX_0.gif"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/gif")
                .set_body_bytes(b"GIF89a".to_vec()),
        )
        .mount(&server)
        .await;
    server
}

fn relay_with(agent: RecordingAgent, server: &MockServer) -> Relay {
    Relay::new(
        AgentSettings::default().with_model("test-model"),
        RadarImageFetcher::new().unwrap(),
        Box::new(agent),
    )
    .with_image_base(format!("{}/ridge/standard", server.uri()))
}

#[tokio::test]
async fn station_nowcast_passes_success_to_agent() {
    let server = radar_server().await;
    let agent = RecordingAgent::default();
    let relay = relay_with(agent.clone(), &server);

    let nowcast = relay.nowcast_station("KOKX").await.unwrap();

    assert_eq!(nowcast.text, "Light Rain Nearby");
    assert_eq!(nowcast.radar_id.as_deref(), Some("KOKX"));
    assert_eq!(nowcast.source_url, format!("{}/ridge/standard/KOKX_0.gif", server.uri()));

    let seen = agent.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "test-model");
    assert!(seen[0].1.is_success());
}

#[tokio::test]
async fn fetch_failure_still_reaches_agent() {
    let server = radar_server().await;
    let agent = RecordingAgent::default();
    let relay = relay_with(agent.clone(), &server);

    let nowcast = relay.nowcast_station("KXYZ").await.unwrap();

    assert_eq!(nowcast.text, "No radar right now");
    assert_eq!(nowcast.radar_id, None);

    let seen = agent.seen.lock().unwrap();
    assert!(seen[0].1.error_message().unwrap().contains("404"));
}

#[tokio::test]
async fn point_nowcast_uses_resolved_station() {
    let server = radar_server().await;
    let agent = RecordingAgent::default();
    let relay = relay_with(agent.clone(), &server);

    let nowcast = relay
        .nowcast_point(&RadarRequest::new("40.7", "-74.0"), &StaticStationResolver::new("KOKX"))
        .await
        .unwrap();

    assert_eq!(nowcast.radar_id.as_deref(), Some("KOKX"));
}

#[tokio::test]
async fn agent_failure_is_propagated_with_context() {
    let server = radar_server().await;
    let agent = RecordingAgent { fail: true, ..RecordingAgent::default() };
    let relay = relay_with(agent, &server);

    let err = relay.nowcast_station("KOKX").await.unwrap_err();

    assert!(err.to_string().contains("radar_nowcaster"));
    assert!(format!("{err:#}").contains("model unavailable"));
}

#[tokio::test]
async fn settings_are_exposed_unchanged() {
    let server = radar_server().await;
    let relay = relay_with(RecordingAgent::default(), &server);

    assert_eq!(relay.settings().model, "test-model");
    assert_eq!(relay.settings().name, "radar_nowcaster");
}
