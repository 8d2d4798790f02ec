//! Local mirror of gateway subscriptions
//!
//! The gateway owns the subscription lifecycle; this table is a read model
//! updated from webhook events. At most one row per user per gateway. Users
//! without a row report the `not_started` status.

use humantic_shared::types::{Gateway, Subscription, SubscriptionStatus};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::BillingResult;

/// Subscription state reported by a gateway webhook
#[derive(Debug, Clone)]
pub struct GatewaySubscriptionUpdate {
    pub user_id: Uuid,
    pub gateway: Gateway,
    pub external_subscription_id: Option<String>,
    pub external_customer_id: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_start: Option<OffsetDateTime>,
    pub current_period_end: Option<OffsetDateTime>,
    pub cancel_at_period_end: bool,
}

/// Subscription mirror persistence
pub struct SubscriptionService {
    pool: PgPool,
}

impl SubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The user's mirrored subscription on a gateway, if any
    pub async fn get_for_user(
        &self,
        user_id: Uuid,
        gateway: Gateway,
    ) -> BillingResult<Option<Subscription>> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = $1 AND gateway = $2",
        )
        .bind(user_id)
        .bind(gateway.to_string())
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// The user's subscription status on a gateway, `NotStarted` when no
    /// mirror row exists
    pub async fn status_for_user(
        &self,
        user_id: Uuid,
        gateway: Gateway,
    ) -> BillingResult<SubscriptionStatus> {
        Ok(self
            .get_for_user(user_id, gateway)
            .await?
            .map(|s| s.subscription_status())
            .unwrap_or_default())
    }

    /// Apply a gateway webhook update, inserting or replacing the single
    /// mirror row for (user, gateway)
    pub async fn apply_update(
        &self,
        update: GatewaySubscriptionUpdate,
    ) -> BillingResult<Subscription> {
        let subscription = sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions
                (id, user_id, gateway, external_subscription_id, external_customer_id,
                 status, current_period_start, current_period_end, cancel_at_period_end)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, gateway) DO UPDATE SET
                external_subscription_id = EXCLUDED.external_subscription_id,
                external_customer_id = EXCLUDED.external_customer_id,
                status = EXCLUDED.status,
                current_period_start = EXCLUDED.current_period_start,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = EXCLUDED.cancel_at_period_end,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(update.user_id)
        .bind(update.gateway.to_string())
        .bind(&update.external_subscription_id)
        .bind(&update.external_customer_id)
        .bind(update.status.to_string())
        .bind(update.current_period_start)
        .bind(update.current_period_end)
        .bind(update.cancel_at_period_end)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            user_id = %update.user_id,
            gateway = %update.gateway,
            status = %update.status,
            "Applied subscription update"
        );

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_missing_subscription_reports_not_started() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = humantic_shared::db::create_pool(&url, 2)
            .await
            .expect("Failed to create pool");
        let service = SubscriptionService::new(pool);

        let status = service
            .status_for_user(Uuid::new_v4(), Gateway::Stripe)
            .await
            .expect("query failed");
        assert_eq!(status, SubscriptionStatus::NotStarted);
    }
}
