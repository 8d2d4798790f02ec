//! Checkout creation across gateways
//!
//! Resolves the requested product, enforces the upgrade-only rule for
//! activations, dispatches to the selected product's gateway, and records
//! the pending ledger row. Gateway calls are made exactly once; a failure
//! surfaces immediately with no ledger side effects.

use humantic_shared::types::{Gateway, PaymentPhase, PlanTier, ProductCategory};
use sqlx::PgPool;
use stripe::{
    CheckoutSession, CheckoutSessionMode, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
};
use uuid::Uuid;

use crate::asaas::AsaasClient;
use crate::catalog::{self, Product};
use crate::client::StripeClient;
use crate::entitlement;
use crate::error::{BillingError, BillingResult};
use crate::ledger::{LedgerService, NewPayment};

/// Response for a created checkout
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

/// Checkout service spanning both gateways
pub struct CheckoutService {
    stripe: StripeClient,
    asaas: AsaasClient,
    ledger: LedgerService,
}

impl CheckoutService {
    pub fn new(stripe: StripeClient, asaas: AsaasClient, pool: PgPool) -> Self {
        Self {
            stripe,
            asaas,
            ledger: LedgerService::new(pool),
        }
    }

    /// Create a hosted checkout for a catalog product.
    ///
    /// `current_plan` is the buyer's plan at request time; activation
    /// products must strictly outrank it. When an `idempotency_key` is
    /// supplied and a pending payment already holds it, the stored checkout
    /// URL is returned without touching the gateway again.
    pub async fn create_checkout(
        &self,
        user_id: Uuid,
        current_plan: Option<PlanTier>,
        price_id: &str,
        idempotency_key: Option<&str>,
    ) -> BillingResult<CheckoutResponse> {
        let product = catalog::product_by_price_id(price_id)
            .ok_or_else(|| BillingError::InvalidProduct(price_id.to_string()))?;

        if product.category == ProductCategory::Activation
            && !entitlement::is_upgrade(current_plan, product.tier)
        {
            return Err(BillingError::UpgradeNotAllowed {
                from: current_plan.map(|t| t.to_string()).unwrap_or_default(),
                to: product.tier.to_string(),
            });
        }

        if let Some(key) = idempotency_key {
            if let Some(existing) = self.ledger.find_pending_by_key(user_id, key).await? {
                if let Some(url) = existing.checkout_url {
                    tracing::info!(
                        user_id = %user_id,
                        payment_id = %existing.id,
                        "Duplicate checkout attempt, returning existing session"
                    );
                    return Ok(CheckoutResponse { checkout_url: url });
                }
            }
        }

        let checkout_url = match product.gateway {
            Gateway::Stripe => self.create_stripe_checkout(user_id, product).await?,
            Gateway::Asaas => self.create_asaas_checkout(product).await?,
        };

        let phase = match product.category {
            ProductCategory::Activation => PaymentPhase::Phase1,
            ProductCategory::Subscription => PaymentPhase::Monthly,
        };

        self.ledger
            .record_pending(NewPayment {
                user_id,
                plan: product.tier,
                phase,
                amount_cents: product.amount_cents,
                currency: "BRL".to_string(),
                gateway: product.gateway,
                idempotency_key: idempotency_key.map(str::to_string),
                checkout_url: Some(checkout_url.clone()),
                due_date: None,
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            price_id = %product.price_id,
            gateway = %product.gateway,
            "Created checkout"
        );

        Ok(CheckoutResponse { checkout_url })
    }

    async fn create_stripe_checkout(
        &self,
        user_id: Uuid,
        product: &Product,
    ) -> BillingResult<String> {
        let base_url = &self.stripe.config().app_base_url;
        let success_url = format!(
            "{}/billing/success?session_id={{CHECKOUT_SESSION_ID}}",
            base_url
        );
        let cancel_url = format!("{}/billing/cancel", base_url);

        let mut metadata = std::collections::HashMap::new();
        metadata.insert("user_id".to_string(), user_id.to_string());
        metadata.insert("plan".to_string(), product.tier.to_string());
        metadata.insert("category".to_string(), product.category.to_string());

        let (mode, line_item) = match product.category {
            // Activation installments are one-off charges with inline price
            // data, no preconfigured Stripe price
            ProductCategory::Activation => (
                CheckoutSessionMode::Payment,
                CreateCheckoutSessionLineItems {
                    price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                        currency: stripe::Currency::BRL,
                        unit_amount: Some(product.amount_cents),
                        product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: product.name.to_string(),
                            description: Some(product.description.to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    }),
                    quantity: Some(1),
                    ..Default::default()
                },
            ),
            ProductCategory::Subscription => (
                CheckoutSessionMode::Subscription,
                CreateCheckoutSessionLineItems {
                    price: Some(self.stripe.config().monthly_price_id(product.tier).to_string()),
                    quantity: Some(1),
                    ..Default::default()
                },
            ),
        };

        let params = CreateCheckoutSession {
            mode: Some(mode),
            line_items: Some(vec![line_item]),
            success_url: Some(&success_url),
            cancel_url: Some(&cancel_url),
            metadata: Some(metadata),
            ..Default::default()
        };

        let session = CheckoutSession::create(self.stripe.inner(), params).await?;

        session.url.ok_or_else(|| {
            BillingError::GatewayApi("Stripe session has no checkout URL".to_string())
        })
    }

    async fn create_asaas_checkout(&self, product: &Product) -> BillingResult<String> {
        let link = self
            .asaas
            .create_payment_link(product.name, product.description, product.amount_cents)
            .await?;
        Ok(link.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asaas::AsaasConfig;
    use crate::client::{PriceIds, StripeConfig};

    fn stripe_client() -> StripeClient {
        StripeClient::new(StripeConfig {
            secret_key: "sk_test_123".to_string(),
            webhook_secret: "whsec_123".to_string(),
            price_ids: PriceIds {
                essencial_monthly: "price_ess".to_string(),
                agenda_monthly: "price_age".to_string(),
                conversao_monthly: "price_con".to_string(),
            },
            app_base_url: "http://localhost:3000".to_string(),
        })
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_gateway_failure_leaves_ledger_untouched() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = humantic_shared::db::create_pool(&url, 2)
            .await
            .expect("Failed to create pool");

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/paymentLinks")
            .with_status(500)
            .with_body("internal error")
            .expect(1)
            .create_async()
            .await;

        let asaas = AsaasClient::new(AsaasConfig {
            api_key: "test_key".to_string(),
            base_url: server.url(),
        });
        let checkout = CheckoutService::new(stripe_client(), asaas, pool.clone());

        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, 'client')")
            .bind(user_id)
            .bind(format!("{}@test.example", user_id))
            .execute(&pool)
            .await
            .expect("user insert failed");

        let err = checkout
            .create_checkout(user_id, None, "essencial-activation-asaas", None)
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::GatewayApi(_)));
        mock.assert_async().await;

        let records = LedgerService::new(pool)
            .list_for_user(user_id)
            .await
            .expect("list failed");
        assert!(records.is_empty());
    }
}
