//! HTTP client for the core banking gateway
//!
//! Talks to the core banking endpoints (or the mock routes this service
//! mounts itself) over HTTP. Timeouts are a client concern here; the
//! caller only sees success or a `GatewayError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
    BureauReport, CoreBankingGateway, CoreStatusReport, GatewayError, QueryBureausRequest,
    RegisterApplicationRequest, RegisterApplicationResponse, ValidateClientRequest,
    ValidateClientResponse,
};

pub struct HttpCoreBankingGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCoreBankingGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|_| GatewayError::InvalidResponse("invalid API key header".into()))?;
            headers.insert("X-API-Key", value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(GatewayError::from)?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Service {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CoreBankingGateway for HttpCoreBankingGateway {
    async fn validate_client(
        &self,
        request: ValidateClientRequest,
    ) -> Result<ValidateClientResponse, GatewayError> {
        tracing::debug!(document = %request.document_number, "validating client in core banking");
        self.post_json("/clients/validate", &request).await
    }

    async fn query_risk_bureaus(
        &self,
        request: QueryBureausRequest,
    ) -> Result<BureauReport, GatewayError> {
        tracing::debug!(document = %request.document_number, "querying risk bureaus");
        self.post_json("/risk-bureaus/query", &request).await
    }

    async fn register_application(
        &self,
        request: RegisterApplicationRequest,
    ) -> Result<RegisterApplicationResponse, GatewayError> {
        tracing::debug!(
            application_number = %request.application_number,
            "registering application in core banking"
        );
        self.post_json("/applications/register", &request).await
    }

    async fn query_status(
        &self,
        core_application_id: &str,
    ) -> Result<CoreStatusReport, GatewayError> {
        tracing::debug!(core_application_id, "polling core application status");
        self.get_json(&format!("/applications/{core_application_id}/status"))
            .await
    }
}
