use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ServiceConfig;

// Uniform result of one analysis call. Exactly one variant is ever
// produced -- the type system enforces what the old ad-hoc result object
// only promised by convention.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Success { body: Value },
    Failure { error_message: String },
}

pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalysisClient {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        // Explicit timeouts: the transport default is "hang until the OS
        // gives up", which stalls the whole request.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .context("Failed to build HTTP client for the analysis backend")?;

        info!("Analysis backend: {}", config.ai_service_url);
        Ok(Self {
            http,
            base_url: config.ai_service_url.clone(),
        })
    }

    // One shot per invocation: Building -> Sent -> Succeeded | Failed.
    // No retries. Every failure mode (refused connection, timeout, non-2xx
    // status, garbage response body) is folded into Failure so callers
    // never see a raw transport error.
    pub async fn analyze(
        &self,
        question: &str,
        shop_domain: &str,
        access_token: &str,
    ) -> AnalysisOutcome {
        let body = json!({
            "query": question,
            "shop_domain": shop_domain,
            "access_token": access_token,
        });

        let response = match self
            .http
            .post(format!("{}/analyze", self.base_url))
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Analysis backend unreachable: {}", e);
                return AnalysisOutcome::Failure {
                    error_message: e.to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Analysis backend rejected the query: {}", status);
            // Report the reason phrase, never the upstream error body.
            return AnalysisOutcome::Failure {
                error_message: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.to_string()),
            };
        }

        match response.json::<Value>().await {
            Ok(body) => AnalysisOutcome::Success { body },
            Err(e) => AnalysisOutcome::Failure {
                error_message: e.to_string(),
            },
        }
    }
}
