// Router for the local status surface
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{get_status, health_check, refresh, reload};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/status", get(get_status))
        .route("/refresh", post(refresh))
        .route("/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::poller::Poller;
    use crate::application::status_service::test_support::ScriptedSource;
    use crate::domain::reading::Reading;
    use crate::infrastructure::config::build_settings;
    use crate::infrastructure::status_board::StatusBoard;
    use serde_json::Value;

    async fn spawn_app(reading: Reading) -> (String, AppState) {
        let board = StatusBoard::new();
        let source = Arc::new(ScriptedSource::new(vec![], reading));
        let settings = build_settings(config::Config::builder()).unwrap();
        let (poller, _task) = Poller::spawn(source, Arc::new(board.clone()), settings);
        let state = AppState { board, poller };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_router(Arc::new(state.clone()));
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{}", addr), state)
    }

    #[tokio::test]
    async fn test_health_check() {
        let (base, _) = spawn_app(Reading::no_data()).await;

        let body = reqwest::get(format!("{}/healthz", base)).await.unwrap().text().await.unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn test_refresh_then_status() {
        let (base, _) = spawn_app(Reading::new(65.0, "SingleDown".to_string(), 1_700_000_000_000)).await;
        let client = reqwest::Client::new();

        let notice: Value = client
            .post(format!("{}/refresh", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(notice["level"], "info");
        assert!(notice["message"].as_str().unwrap().starts_with("Last entry: "));

        let status: Value = client
            .get(format!("{}/status", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["text"], "65.0 mg/dL ↓");
        assert_eq!(status["band"], "low-warning");
        assert_eq!(status["background"], "statusBarItem.warningBackground");
        assert_eq!(status["visible"], true);
        assert!(
            status["notices"]
                .as_array()
                .unwrap()
                .iter()
                .any(|n| n["message"] == "Low blood glucose!")
        );
    }

    #[tokio::test]
    async fn test_refresh_after_shutdown_is_unavailable() {
        let (base, state) = spawn_app(Reading::no_data()).await;
        state.poller.shutdown().await;

        let response = reqwest::Client::new()
            .post(format!("{}/refresh", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_reload_after_shutdown_is_unavailable() {
        let (base, state) = spawn_app(Reading::no_data()).await;
        state.poller.shutdown().await;

        let response = reqwest::Client::new()
            .post(format!("{}/reload", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().is_some());
    }
}
