//! Health route.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub lt_url_present: bool,
    pub lt_api_key_present: bool,
}

/// Liveness plus translation-service configuration presence.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let translator = &state.config.translator;
    Json(HealthResponse {
        ok: true,
        lt_url_present: translator.has_api_base(),
        lt_api_key_present: translator.has_api_key(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use layout_translator_core::{AppConfig, TranslatorConfig};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::routes::router;
    use crate::state::AppState;

    #[tokio::test]
    async fn test_health_reports_config_presence() {
        let config = AppConfig {
            translator: TranslatorConfig::new(Some("http://lt.local".to_string()), Some("  ".to_string())),
            ..AppConfig::default()
        };
        let app = router(Arc::new(AppState::new(config).unwrap()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ok": true, "lt_url_present": true, "lt_api_key_present": false})
        );
    }
}
