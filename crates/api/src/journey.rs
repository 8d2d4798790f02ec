//! Onboarding journey notifications
//!
//! Stage transitions are forwarded to an n8n automation over webhooks. The
//! notification is best-effort: failures are logged and never fail the
//! request that triggered them.

use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Onboarding stages, in journey order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyStage {
    Entrada,
    Ajuste,
    Integracao,
    Revisao,
}

impl std::fmt::Display for JourneyStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Entrada => write!(f, "entrada"),
            Self::Ajuste => write!(f, "ajuste"),
            Self::Integracao => write!(f, "integracao"),
            Self::Revisao => write!(f, "revisao"),
        }
    }
}

impl std::str::FromStr for JourneyStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entrada" => Ok(Self::Entrada),
            "ajuste" => Ok(Self::Ajuste),
            "integracao" => Ok(Self::Integracao),
            "revisao" => Ok(Self::Revisao),
            _ => Err(format!("Invalid journey stage: {}", s)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StagePayload<'a> {
    user_id: Uuid,
    email: &'a str,
    stage: JourneyStage,
    occurred_at: String,
}

/// Fire-and-forget webhook client for journey stage transitions
#[derive(Clone)]
pub struct JourneyNotifier {
    http: reqwest::Client,
    base_url: Option<String>,
}

impl JourneyNotifier {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Notify n8n of a stage transition. A missing base URL disables
    /// notifications; delivery failures are logged, never propagated.
    pub async fn notify(&self, stage: JourneyStage, user_id: Uuid, email: &str) {
        let Some(base_url) = &self.base_url else {
            tracing::debug!(stage = %stage, "Journey webhooks disabled, skipping");
            return;
        };

        let occurred_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        let payload = StagePayload {
            user_id,
            email,
            stage,
            occurred_at,
        };

        let url = format!("{}/webhook/{}", base_url, stage);
        match self.http.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(user_id = %user_id, stage = %stage, "Journey stage notified");
            }
            Ok(response) => {
                tracing::warn!(
                    user_id = %user_id,
                    stage = %stage,
                    status = %response.status(),
                    "Journey webhook rejected"
                );
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %user_id,
                    stage = %stage,
                    error = %err,
                    "Journey webhook delivery failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_parse_and_display() {
        assert_eq!("entrada".parse::<JourneyStage>().unwrap(), JourneyStage::Entrada);
        assert_eq!("REVISAO".parse::<JourneyStage>().unwrap(), JourneyStage::Revisao);
        assert!("done".parse::<JourneyStage>().is_err());
        assert_eq!(JourneyStage::Integracao.to_string(), "integracao");
    }

    #[tokio::test]
    async fn test_notify_posts_stage_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/ajuste")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create_async()
            .await;

        let notifier = JourneyNotifier::new(Some(server.url()));
        notifier
            .notify(JourneyStage::Ajuste, Uuid::new_v4(), "user@example.com")
            .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_notify_without_base_url_is_noop() {
        // Must not panic or attempt any network call
        let notifier = JourneyNotifier::new(None);
        notifier
            .notify(JourneyStage::Entrada, Uuid::new_v4(), "user@example.com")
            .await;
    }

    #[tokio::test]
    async fn test_notify_swallows_delivery_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/webhook/revisao")
            .with_status(500)
            .create_async()
            .await;

        let notifier = JourneyNotifier::new(Some(server.url()));
        // Returns normally despite the 500
        notifier
            .notify(JourneyStage::Revisao, Uuid::new_v4(), "user@example.com")
            .await;

        mock.assert_async().await;
    }
}
