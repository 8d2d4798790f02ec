//! Stripe client configuration

use humantic_shared::types::PlanTier;
use stripe::Client;

use crate::error::{BillingError, BillingResult};

/// Configuration for Stripe billing
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Stripe secret API key
    pub secret_key: String,
    /// Stripe webhook signing secret
    pub webhook_secret: String,
    /// Price IDs for each recurring subscription tier
    pub price_ids: PriceIds,
    /// Base URL for success/cancel redirects
    pub app_base_url: String,
}

/// Stripe price IDs for the monthly subscription of each tier.
/// Activation fees are charged with inline price data and need no
/// preconfigured price.
#[derive(Debug, Clone)]
pub struct PriceIds {
    pub essencial_monthly: String,
    pub agenda_monthly: String,
    pub conversao_monthly: String,
}

impl StripeConfig {
    /// Create config from environment variables
    pub fn from_env() -> BillingResult<Self> {
        Ok(Self {
            secret_key: std::env::var("STRIPE_SECRET_KEY")
                .map_err(|_| BillingError::Config("STRIPE_SECRET_KEY not set".to_string()))?,
            webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET")
                .map_err(|_| BillingError::Config("STRIPE_WEBHOOK_SECRET not set".to_string()))?,
            price_ids: PriceIds {
                essencial_monthly: std::env::var("STRIPE_PRICE_ESSENCIAL_MONTHLY").map_err(
                    |_| BillingError::Config("STRIPE_PRICE_ESSENCIAL_MONTHLY not set".to_string()),
                )?,
                agenda_monthly: std::env::var("STRIPE_PRICE_AGENDA_MONTHLY").map_err(|_| {
                    BillingError::Config("STRIPE_PRICE_AGENDA_MONTHLY not set".to_string())
                })?,
                conversao_monthly: std::env::var("STRIPE_PRICE_CONVERSAO_MONTHLY").map_err(
                    |_| BillingError::Config("STRIPE_PRICE_CONVERSAO_MONTHLY not set".to_string()),
                )?,
            },
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        })
    }

    /// Get the Stripe price ID for a tier's monthly subscription
    pub fn monthly_price_id(&self, tier: PlanTier) -> &str {
        match tier {
            PlanTier::Essencial => &self.price_ids.essencial_monthly,
            PlanTier::Agenda => &self.price_ids.agenda_monthly,
            PlanTier::Conversao => &self.price_ids.conversao_monthly,
        }
    }

    /// Get the tier from a Stripe price ID
    pub fn tier_for_price_id(&self, price_id: &str) -> Option<PlanTier> {
        if price_id == self.price_ids.essencial_monthly {
            Some(PlanTier::Essencial)
        } else if price_id == self.price_ids.agenda_monthly {
            Some(PlanTier::Agenda)
        } else if price_id == self.price_ids.conversao_monthly {
            Some(PlanTier::Conversao)
        } else {
            None
        }
    }
}

/// Stripe billing client
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
}

impl StripeClient {
    /// Create a new Stripe client from config
    pub fn new(config: StripeConfig) -> Self {
        let client = Client::new(&config.secret_key);
        Self { client, config }
    }

    /// Create a new Stripe client from environment variables
    pub fn from_env() -> BillingResult<Self> {
        let config = StripeConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the inner Stripe client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the config
    pub fn config(&self) -> &StripeConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StripeConfig {
        StripeConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_123".to_string(),
            price_ids: PriceIds {
                essencial_monthly: "price_ess".to_string(),
                agenda_monthly: "price_age".to_string(),
                conversao_monthly: "price_con".to_string(),
            },
            app_base_url: "http://localhost:3000".to_string(),
        }
    }

    #[test]
    fn test_monthly_price_id_mapping() {
        let config = test_config();
        assert_eq!(config.monthly_price_id(PlanTier::Essencial), "price_ess");
        assert_eq!(config.monthly_price_id(PlanTier::Conversao), "price_con");
    }

    #[test]
    fn test_tier_for_price_id() {
        let config = test_config();
        assert_eq!(config.tier_for_price_id("price_age"), Some(PlanTier::Agenda));
        assert_eq!(config.tier_for_price_id("price_unknown"), None);
    }
}
