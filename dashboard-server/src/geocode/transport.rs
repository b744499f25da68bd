//! JSON GET plumbing shared by the geocoders.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::retry::RetryPolicy;

use super::error::GeocodeError;

#[derive(Debug, Clone)]
pub(super) struct JsonClient {
    http: reqwest::Client,
    semaphore: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl JsonClient {
    pub(super) fn new(
        user_agent: &str,
        timeout_secs: u64,
        max_concurrent: usize,
        retry: RetryPolicy,
    ) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            retry,
        })
    }

    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, GeocodeError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| GeocodeError::Config("semaphore closed".to_string()))?;

        let operation = url.path().to_string();
        let query = &query;
        self.retry
            .run(&operation, move || self.get_json_once(url.clone(), query))
            .await
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, GeocodeError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| GeocodeError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

pub(super) fn parse_base_url(url: &str) -> Result<Url, GeocodeError> {
    Url::parse(url).map_err(|e| GeocodeError::Config(format!("invalid base URL {url}: {e}")))
}
