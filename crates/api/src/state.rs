//! Shared application state

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{AuthState, JwtManager};
use crate::config::Config;
use crate::journey::JourneyNotifier;

#[cfg(feature = "billing")]
use humantic_billing::{
    AsaasClient, CheckoutService, LedgerService, StripeClient, SubscriptionService,
};

/// Billing services, present when the billing feature is enabled at compile
/// time and ENABLE_BILLING allows it at runtime
#[cfg(feature = "billing")]
#[derive(Clone)]
pub struct BillingState {
    pub checkout: Arc<CheckoutService>,
    pub ledger: Arc<LedgerService>,
    pub subscriptions: Arc<SubscriptionService>,
}

#[cfg(feature = "billing")]
impl BillingState {
    /// Build billing services from environment configuration
    pub fn from_env(pool: PgPool) -> Result<Self, humantic_billing::BillingError> {
        let stripe = StripeClient::from_env()?;
        let asaas = AsaasClient::from_env()?;
        Ok(Self {
            checkout: Arc::new(CheckoutService::new(stripe, asaas, pool.clone())),
            ledger: Arc::new(LedgerService::new(pool.clone())),
            subscriptions: Arc::new(SubscriptionService::new(pool)),
        })
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtManager,
    pub journey: JourneyNotifier,
    #[cfg(feature = "billing")]
    pub billing: Option<BillingState>,
}

impl AppState {
    pub fn new(
        config: Config,
        pool: PgPool,
        #[cfg(feature = "billing")] billing: Option<BillingState>,
    ) -> Self {
        let jwt = JwtManager::new(&config.jwt_secret, config.jwt_expiry_hours);
        let journey = JourneyNotifier::new(config.n8n_webhook_base_url.clone());
        Self {
            pool,
            config: Arc::new(config),
            jwt,
            journey,
            #[cfg(feature = "billing")]
            billing,
        }
    }

    /// State handed to the auth middleware
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            jwt: self.jwt.clone(),
        }
    }

    /// Billing services, or the disabled error when billing is off
    #[cfg(feature = "billing")]
    pub fn billing(&self) -> Result<&BillingState, crate::error::ApiError> {
        self.billing
            .as_ref()
            .ok_or(crate::error::ApiError::BillingDisabled)
    }
}
