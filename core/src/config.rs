use std::env;

// Process-wide configuration, resolved exactly once at startup and passed
// down by reference. Nothing reads the environment after this point, so a
// request can never observe a mid-flight config change.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub ai_service_url: String,      // Base URL of the analysis backend
    pub request_timeout_secs: u64,   // Whole-request deadline for one downstream call
    pub connect_timeout_secs: u64,   // How long to wait for the backend to pick up

    // The fallback identity is a demo/offline convenience. Production
    // deployments set ALLOW_ANONYMOUS_FALLBACK=false so a missing session
    // surfaces as 401 instead of a spoofed shop.
    pub allow_anonymous_fallback: bool,
    pub fallback_shop_domain: String,
    pub fallback_access_token: String,

    pub bind_addr: String,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            ai_service_url: env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            request_timeout_secs: env::var("AI_SERVICE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            connect_timeout_secs: env::var("AI_SERVICE_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            allow_anonymous_fallback: env::var("ALLOW_ANONYMOUS_FALLBACK")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            fallback_shop_domain: env::var("FALLBACK_SHOP_DOMAIN")
                .unwrap_or_else(|_| "test-store.myshopify.com".to_string()),
            fallback_access_token: env::var("FALLBACK_ACCESS_TOKEN")
                .unwrap_or_else(|_| "shpat_mock_token_12345".to_string()),
            bind_addr: env::var("GATEWAY_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        }
    }
}
