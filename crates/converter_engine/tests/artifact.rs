use std::fs;

use converter_core::ErrorOrigin;
use converter_engine::{artifact_file_name, JobClient, ReqwestJobClient, ServiceSettings};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ReqwestJobClient {
    ReqwestJobClient::new(ServiceSettings::with_base_url(&server.uri()).unwrap()).unwrap()
}

#[tokio::test]
async fn artifact_is_saved_to_output_dir() {
    let server = MockServer::start().await;
    let archive = b"PK\x03\x04 pretend zip with mobi files".to_vec();
    Mock::given(method("GET"))
        .and(path("/download/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(archive.clone(), "application/zip"))
        .mount(&server)
        .await;
    let out = TempDir::new().unwrap();

    let saved = client_for(&server)
        .fetch_artifact("c1", out.path())
        .await
        .expect("download ok");

    assert_eq!(saved, out.path().join(artifact_file_name("c1")));
    assert_eq!(fs::read(&saved).unwrap(), archive);
}

#[tokio::test]
async fn unknown_conversion_is_rejected_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Conversion ID not found" })),
        )
        .mount(&server)
        .await;
    let out = TempDir::new().unwrap();

    let err = client_for(&server)
        .fetch_artifact("missing", out.path())
        .await
        .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::ServerRejected);
    assert_eq!(err.message, "Conversion ID not found");
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn oversized_artifact_is_refused_and_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/download/c1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 4096], "application/zip"))
        .mount(&server)
        .await;
    let settings = ServiceSettings {
        max_artifact_bytes: 1024,
        ..ServiceSettings::with_base_url(&server.uri()).unwrap()
    };
    let out = TempDir::new().unwrap();

    let err = ReqwestJobClient::new(settings)
        .unwrap()
        .fetch_artifact("c1", out.path())
        .await
        .unwrap_err();

    assert_eq!(err.origin, ErrorOrigin::Unexpected);
    assert!(err.message.contains("exceeds 1024 bytes"));
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}
