use std::env;
use std::sync::Arc;

use crate::config::ServiceConfig;

// What the platform app-engine hands us when a merchant is signed in.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub shop: String,
    pub access_token: String,
}

// The identity the rest of the pipeline runs with. Always fully populated
// before use; there is no such thing as a half-filled pair.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub shop_domain: String,
    pub access_token: String,
}

// Seam to the external session capability. The gateway only ever asks
// "is there an active session right now?" -- no writes, no lifecycle.
pub trait SessionSource: Send + Sync {
    fn active_session(&self) -> Option<ActiveSession>;
}

// Stand-in source for deployments without the app engine: the session is
// injected through the environment. Captured once at construction so a
// request never observes a mid-flight env change.
pub struct EnvSessionSource {
    session: Option<ActiveSession>,
}

impl EnvSessionSource {
    pub fn from_env() -> Self {
        let session = match (
            env::var("SHOPIFY_SHOP_DOMAIN"),
            env::var("SHOPIFY_ACCESS_TOKEN"),
        ) {
            (Ok(shop), Ok(access_token)) => Some(ActiveSession { shop, access_token }),
            _ => None,
        };
        Self { session }
    }
}

impl SessionSource for EnvSessionSource {
    fn active_session(&self) -> Option<ActiveSession> {
        self.session.clone()
    }
}

pub struct SessionResolver {
    source: Arc<dyn SessionSource>,
    fallback: Option<SessionContext>, // None = anonymous fallback disabled
}

impl SessionResolver {
    pub fn new(source: Arc<dyn SessionSource>, config: &ServiceConfig) -> Self {
        let fallback = config.allow_anonymous_fallback.then(|| SessionContext {
            shop_domain: config.fallback_shop_domain.clone(),
            access_token: config.fallback_access_token.clone(),
        });
        Self { source, fallback }
    }

    // An active session wins, verbatim. Otherwise the configured fallback
    // pair (demo mode), otherwise None and the caller reports an
    // authentication failure. Never panics, never errors.
    pub fn resolve(&self) -> Option<SessionContext> {
        if let Some(session) = self.source.active_session() {
            return Some(SessionContext {
                shop_domain: session.shop,
                access_token: session.access_token,
            });
        }
        self.fallback.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedSource(Option<ActiveSession>);

    impl SessionSource for FixedSource {
        fn active_session(&self) -> Option<ActiveSession> {
            self.0.clone()
        }
    }

    fn test_config(allow_fallback: bool) -> ServiceConfig {
        ServiceConfig {
            ai_service_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
            allow_anonymous_fallback: allow_fallback,
            fallback_shop_domain: "test-store.myshopify.com".to_string(),
            fallback_access_token: "shpat_mock_token_12345".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }

    #[test]
    fn active_session_is_passed_through_verbatim() {
        let source = Arc::new(FixedSource(Some(ActiveSession {
            shop: "real-store.myshopify.com".to_string(),
            access_token: "shpat_real_token".to_string(),
        })));
        let resolver = SessionResolver::new(source, &test_config(true));

        let ctx = resolver.resolve().unwrap();
        assert_eq!(ctx.shop_domain, "real-store.myshopify.com");
        assert_eq!(ctx.access_token, "shpat_real_token");
    }

    #[test]
    fn missing_session_falls_back_to_configured_identity() {
        let resolver = SessionResolver::new(Arc::new(FixedSource(None)), &test_config(true));

        let ctx = resolver.resolve().unwrap();
        assert_eq!(ctx.shop_domain, "test-store.myshopify.com");
        assert_eq!(ctx.access_token, "shpat_mock_token_12345");
    }

    #[test]
    fn fallback_can_be_disabled() {
        let resolver = SessionResolver::new(Arc::new(FixedSource(None)), &test_config(false));

        assert!(resolver.resolve().is_none());
    }

    #[test]
    fn active_session_wins_even_when_fallback_is_enabled() {
        let source = Arc::new(FixedSource(Some(ActiveSession {
            shop: "real-store.myshopify.com".to_string(),
            access_token: "shpat_real_token".to_string(),
        })));
        let resolver = SessionResolver::new(source, &test_config(true));

        let ctx = resolver.resolve().unwrap();
        assert_ne!(ctx.shop_domain, "test-store.myshopify.com");
    }
}
