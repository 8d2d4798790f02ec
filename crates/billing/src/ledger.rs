//! Two-phase payment ledger
//!
//! Activation fees are split 50/50: a paid phase 1 schedules a pending
//! phase 2 for the same plan, and a paid phase 2 promotes the user's plan.
//! Paid records are immutable; status only ever moves away from pending.

use humantic_shared::types::{
    Gateway, PaymentPhase, PaymentStatus, PaymentTracking, PlanTier,
};
use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::error::{BillingError, BillingResult};

/// Days between the phase 1 confirmation and the phase 2 due date
const PHASE2_DUE_DAYS: i64 = 30;

/// A payment record to be created in pending state
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: Uuid,
    pub plan: PlanTier,
    pub phase: PaymentPhase,
    pub amount_cents: i64,
    pub currency: String,
    pub gateway: Gateway,
    pub idempotency_key: Option<String>,
    pub checkout_url: Option<String>,
    pub due_date: Option<OffsetDateTime>,
}

/// Aggregate view over a user's payment records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LedgerSummary {
    pub total_paid_cents: i64,
    pub total_pending_cents: i64,
    pub paid_count: usize,
    pub pending_count: usize,
    pub failed_count: usize,
}

/// Compute totals for a set of payment records. Cancelled records are
/// excluded from every total.
pub fn summarize(records: &[PaymentTracking]) -> LedgerSummary {
    let mut summary = LedgerSummary::default();
    for record in records {
        match record.payment_status() {
            PaymentStatus::Paid => {
                summary.total_paid_cents += record.amount_cents;
                summary.paid_count += 1;
            }
            PaymentStatus::Pending => {
                summary.total_pending_cents += record.amount_cents;
                summary.pending_count += 1;
            }
            PaymentStatus::Failed => summary.failed_count += 1,
            PaymentStatus::Cancelled => {}
        }
    }
    summary
}

/// Payment ledger persistence
pub struct LedgerService {
    pool: PgPool,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a new pending payment.
    /// A phase 2 record is only accepted once a paid phase 1 exists for the
    /// same user and plan.
    pub async fn record_pending(&self, payment: NewPayment) -> BillingResult<PaymentTracking> {
        if payment.phase == PaymentPhase::Phase2 {
            self.ensure_phase1_paid(payment.user_id, payment.plan).await?;
        }

        let record = sqlx::query_as::<_, PaymentTracking>(
            r#"
            INSERT INTO payment_tracking
                (id, user_id, plan_type, phase, status, amount_cents, currency,
                 gateway, idempotency_key, checkout_url, due_date)
            VALUES ($1, $2, $3, $4, 'pending', $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(payment.user_id)
        .bind(payment.plan.to_string())
        .bind(payment.phase.to_string())
        .bind(payment.amount_cents)
        .bind(&payment.currency)
        .bind(payment.gateway.to_string())
        .bind(&payment.idempotency_key)
        .bind(&payment.checkout_url)
        .bind(payment.due_date)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            payment_id = %record.id,
            user_id = %record.user_id,
            plan = %record.plan_type,
            phase = %record.phase,
            amount_cents = record.amount_cents,
            "Recorded pending payment"
        );

        Ok(record)
    }

    async fn ensure_phase1_paid(&self, user_id: Uuid, plan: PlanTier) -> BillingResult<()> {
        let paid_phase1: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM payment_tracking
            WHERE user_id = $1 AND plan_type = $2 AND phase = 'phase1' AND status = 'paid'
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(plan.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if paid_phase1.is_none() {
            return Err(BillingError::PhaseOrderViolation(format!(
                "user {} has no paid phase1 for plan {}",
                user_id, plan
            )));
        }
        Ok(())
    }

    /// Find a pending record matching an idempotency key, if any.
    /// Used to short-circuit duplicate checkout attempts.
    pub async fn find_pending_by_key(
        &self,
        user_id: Uuid,
        idempotency_key: &str,
    ) -> BillingResult<Option<PaymentTracking>> {
        let record = sqlx::query_as::<_, PaymentTracking>(
            r#"
            SELECT * FROM payment_tracking
            WHERE user_id = $1 AND idempotency_key = $2 AND status = 'pending'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Mark a pending payment as paid.
    /// A paid phase 1 schedules the pending phase 2 installment; a paid
    /// phase 2 promotes the user to the activated plan.
    pub async fn mark_paid(
        &self,
        payment_id: Uuid,
        paid_at: OffsetDateTime,
    ) -> BillingResult<PaymentTracking> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, PaymentTracking>(
            "SELECT * FROM payment_tracking WHERE id = $1 FOR UPDATE",
        )
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BillingError::NotFound(format!("payment {}", payment_id)))?;

        if record.payment_status() == PaymentStatus::Paid {
            return Err(BillingError::ImmutableRecord(payment_id));
        }

        let updated = sqlx::query_as::<_, PaymentTracking>(
            r#"
            UPDATE payment_tracking
            SET status = 'paid', paid_at = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(paid_at)
        .fetch_one(&mut *tx)
        .await?;

        match updated.payment_phase() {
            Some(PaymentPhase::Phase1) => {
                // Schedule the second installment
                sqlx::query(
                    r#"
                    INSERT INTO payment_tracking
                        (id, user_id, plan_type, phase, status, amount_cents, currency,
                         gateway, due_date)
                    VALUES ($1, $2, $3, 'phase2', 'pending', $4, $5, $6, $7)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(updated.user_id)
                .bind(&updated.plan_type)
                .bind(updated.amount_cents)
                .bind(&updated.currency)
                .bind(&updated.gateway)
                .bind(paid_at + Duration::days(PHASE2_DUE_DAYS))
                .execute(&mut *tx)
                .await?;

                tracing::info!(
                    user_id = %updated.user_id,
                    plan = %updated.plan_type,
                    "Phase 1 paid, scheduled phase 2"
                );
            }
            Some(PaymentPhase::Phase2) => {
                // Activation complete, promote the plan
                sqlx::query("UPDATE users SET plan = $2, updated_at = NOW() WHERE id = $1")
                    .bind(updated.user_id)
                    .bind(&updated.plan_type)
                    .execute(&mut *tx)
                    .await?;

                tracing::info!(
                    user_id = %updated.user_id,
                    plan = %updated.plan_type,
                    "Phase 2 paid, plan activated"
                );
            }
            _ => {}
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Mark a pending payment as failed
    pub async fn mark_failed(&self, payment_id: Uuid) -> BillingResult<PaymentTracking> {
        self.transition(payment_id, PaymentStatus::Failed).await
    }

    /// Mark a pending payment as cancelled
    pub async fn mark_cancelled(&self, payment_id: Uuid) -> BillingResult<PaymentTracking> {
        self.transition(payment_id, PaymentStatus::Cancelled).await
    }

    async fn transition(
        &self,
        payment_id: Uuid,
        status: PaymentStatus,
    ) -> BillingResult<PaymentTracking> {
        // Lock the row so a concurrent mark_paid cannot land between the
        // status check and the update
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, PaymentTracking>(
            "SELECT * FROM payment_tracking WHERE id = $1 FOR UPDATE",
        )
        .bind(payment_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| BillingError::NotFound(format!("payment {}", payment_id)))?;

        if record.payment_status() == PaymentStatus::Paid {
            return Err(BillingError::ImmutableRecord(payment_id));
        }

        let updated = sqlx::query_as::<_, PaymentTracking>(
            r#"
            UPDATE payment_tracking
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(payment_id)
        .bind(status.to_string())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            payment_id = %payment_id,
            status = %status,
            "Payment status transition"
        );

        Ok(updated)
    }

    /// All payment records for a user, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> BillingResult<Vec<PaymentTracking>> {
        let records = sqlx::query_as::<_, PaymentTracking>(
            "SELECT * FROM payment_tracking WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: PaymentStatus, amount_cents: i64) -> PaymentTracking {
        let now = OffsetDateTime::now_utc();
        PaymentTracking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan_type: "agenda".to_string(),
            phase: "phase1".to_string(),
            status: status.to_string(),
            amount_cents,
            currency: "BRL".to_string(),
            gateway: "stripe".to_string(),
            idempotency_key: None,
            checkout_url: None,
            due_date: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), LedgerSummary::default());
    }

    #[test]
    fn test_summarize_mixed_statuses() {
        let records = vec![
            record(PaymentStatus::Paid, 149_700),
            record(PaymentStatus::Paid, 149_700),
            record(PaymentStatus::Pending, 49_700),
            record(PaymentStatus::Failed, 49_700),
            record(PaymentStatus::Cancelled, 99_700),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_paid_cents, 299_400);
        assert_eq!(summary.total_pending_cents, 49_700);
        assert_eq!(summary.paid_count, 2);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.failed_count, 1);
    }

    #[test]
    fn test_summarize_ignores_cancelled_amounts() {
        let records = vec![record(PaymentStatus::Cancelled, 199_700)];
        let summary = summarize(&records);
        assert_eq!(summary.total_paid_cents, 0);
        assert_eq!(summary.total_pending_cents, 0);
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_paid_record_is_immutable() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = humantic_shared::db::create_pool(&url, 2)
            .await
            .expect("Failed to create pool");
        let ledger = LedgerService::new(pool.clone());

        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, role) VALUES ($1, $2, 'client')")
            .bind(user_id)
            .bind(format!("{}@test.example", user_id))
            .execute(&pool)
            .await
            .expect("user insert failed");

        let pending = ledger
            .record_pending(NewPayment {
                user_id,
                plan: PlanTier::Essencial,
                phase: PaymentPhase::Phase1,
                amount_cents: 99_700,
                currency: "BRL".to_string(),
                gateway: Gateway::Asaas,
                idempotency_key: None,
                checkout_url: None,
                due_date: None,
            })
            .await
            .expect("insert failed");

        ledger
            .mark_paid(pending.id, OffsetDateTime::now_utc())
            .await
            .expect("mark_paid failed");

        let err = ledger.mark_cancelled(pending.id).await.unwrap_err();
        assert!(matches!(err, BillingError::ImmutableRecord(_)));

        let err = ledger.mark_failed(pending.id).await.unwrap_err();
        assert!(matches!(err, BillingError::ImmutableRecord(_)));
    }

    #[tokio::test]
    #[ignore] // Requires database
    async fn test_phase2_requires_paid_phase1() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = humantic_shared::db::create_pool(&url, 2)
            .await
            .expect("Failed to create pool");
        let ledger = LedgerService::new(pool);

        let err = ledger
            .record_pending(NewPayment {
                user_id: Uuid::new_v4(),
                plan: PlanTier::Agenda,
                phase: PaymentPhase::Phase2,
                amount_cents: 149_700,
                currency: "BRL".to_string(),
                gateway: Gateway::Stripe,
                idempotency_key: None,
                checkout_url: None,
                due_date: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::PhaseOrderViolation(_)));
    }
}
