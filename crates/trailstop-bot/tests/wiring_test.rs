//! End-to-end wiring tests over the public application surface.

use trailstop_bot::{AppConfig, AppError, Application, Secrets, SymbolConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn secrets(seed: Option<&str>) -> Secrets {
    Secrets {
        encryption_key_hex: "ab".repeat(32),
        seed_refresh_token: seed.map(str::to_string),
    }
}

async fn mock_token_endpoint(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/oauth2/token"))
        .and(query_param("refresh_token", "seed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "api_server": format!("{}/", server.uri()),
            "expires_in": 1800,
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_wires_up_and_bootstraps_from_seed() {
    let server = MockServer::start().await;
    mock_token_endpoint(&server).await;

    let config = AppConfig {
        login_url: server.uri(),
        symbols: vec![
            SymbolConfig {
                ticker: "AAPL".to_string(),
                price: "150".parse().unwrap(),
                currency: "USD".to_string(),
            },
            // Duplicate of the first entry after normalization; must be
            // logged and ignored, not fatal.
            SymbolConfig {
                ticker: "aapl".to_string(),
                price: "1".parse().unwrap(),
                currency: "USD".to_string(),
            },
        ],
        ..AppConfig::default()
    };

    Application::new(config, secrets(Some("seed")))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_seed_on_first_start_is_fatal() {
    let server = MockServer::start().await;
    let config = AppConfig {
        login_url: server.uri(),
        ..AppConfig::default()
    };

    let err = Application::new(config, secrets(None)).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn test_bad_encryption_key_is_fatal() {
    let server = MockServer::start().await;
    let config = AppConfig {
        login_url: server.uri(),
        ..AppConfig::default()
    };
    let bad = Secrets {
        encryption_key_hex: "not-hex".to_string(),
        seed_refresh_token: Some("seed".to_string()),
    };

    let err = Application::new(config, bad).await.unwrap_err();
    assert!(matches!(err, AppError::Auth(_)));
}

#[tokio::test]
async fn test_unparseable_configured_symbol_is_fatal() {
    let server = MockServer::start().await;
    mock_token_endpoint(&server).await;

    let config = AppConfig {
        login_url: server.uri(),
        symbols: vec![SymbolConfig {
            ticker: "   ".to_string(),
            price: "10".parse().unwrap(),
            currency: "USD".to_string(),
        }],
        ..AppConfig::default()
    };

    let err = Application::new(config, secrets(Some("seed")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("trailstop-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        r#"
        sync_interval_secs = 60

        [[symbols]]
        ticker = "GME"
        price = 25.0
        "#,
    )
    .unwrap();

    let config = AppConfig::from_file(path.to_str().unwrap()).unwrap();
    assert_eq!(config.sync_interval_secs, 60);
    assert_eq!(config.symbols.len(), 1);
    assert_eq!(config.symbols[0].ticker, "GME");

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_missing_config_file_is_config_error() {
    let err = AppConfig::from_file("/nonexistent/config.toml").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}
