//! Asaas payment link client
//!
//! Asaas exposes hosted payment links over a plain REST API. A single
//! request creates the link; there is no retry, a gateway failure surfaces
//! to the caller immediately.

use serde::{Deserialize, Serialize};

use crate::error::{BillingError, BillingResult};

const DEFAULT_BASE_URL: &str = "https://api.asaas.com";

/// Configuration for the Asaas gateway
#[derive(Debug, Clone)]
pub struct AsaasConfig {
    pub api_key: String,
    pub base_url: String,
}

impl AsaasConfig {
    /// Create config from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Ok(Self {
            api_key: std::env::var("ASAAS_API_KEY")
                .map_err(|_| BillingError::Config("ASAAS_API_KEY not set".to_string()))?,
            base_url: std::env::var("ASAAS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePaymentLink<'a> {
    name: &'a str,
    description: &'a str,
    /// Value in BRL (Asaas uses decimal reais, not cents)
    value: f64,
    billing_type: &'a str,
    charge_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct PaymentLinkResponse {
    id: String,
    url: String,
}

/// Created Asaas payment link
#[derive(Debug, Clone)]
pub struct AsaasPaymentLink {
    pub id: String,
    pub url: String,
}

/// Asaas billing client
#[derive(Clone)]
pub struct AsaasClient {
    http: reqwest::Client,
    config: AsaasConfig,
}

impl AsaasClient {
    pub fn new(config: AsaasConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Create a new Asaas client from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Ok(Self::new(AsaasConfig::from_env()?))
    }

    /// Create a hosted payment link for a one-off or recurring charge
    pub async fn create_payment_link(
        &self,
        name: &str,
        description: &str,
        amount_cents: i64,
    ) -> BillingResult<AsaasPaymentLink> {
        let body = CreatePaymentLink {
            name,
            description,
            value: amount_cents as f64 / 100.0,
            billing_type: "UNDEFINED",
            charge_type: "DETACHED",
        };

        let response = self
            .http
            .post(format!("{}/v3/paymentLinks", self.config.base_url))
            .header("access_token", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %text,
                "Asaas payment link creation failed"
            );
            return Err(BillingError::GatewayApi(format!(
                "Asaas returned {}: {}",
                status, text
            )));
        }

        let link: PaymentLinkResponse = response.json().await?;

        tracing::info!(link_id = %link.id, "Created Asaas payment link");

        Ok(AsaasPaymentLink {
            id: link.id,
            url: link.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> AsaasClient {
        AsaasClient::new(AsaasConfig {
            api_key: "test_key".to_string(),
            base_url: server.url(),
        })
    }

    #[tokio::test]
    async fn test_create_payment_link_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/paymentLinks")
            .match_header("access_token", "test_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"pl_123","url":"https://pay.asaas.com/pl_123"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let link = client
            .create_payment_link("Agente Agenda - Ativacao", "1a parcela", 149_700)
            .await
            .unwrap();

        assert_eq!(link.id, "pl_123");
        assert_eq!(link.url, "https://pay.asaas.com/pl_123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_payment_link_gateway_error() {
        let mut server = mockito::Server::new_async().await;
        // Only one expected call: failures are not retried
        let mock = server
            .mock("POST", "/v3/paymentLinks")
            .with_status(500)
            .with_body("internal error")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client
            .create_payment_link("Agente Essencial - Ativacao", "1a parcela", 99_700)
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::GatewayApi(_)));
        mock.assert_async().await;
    }
}
