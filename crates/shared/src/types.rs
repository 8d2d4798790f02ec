//! Common types used across HumanTic

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Enums
// =============================================================================

/// Agent plan tier, totally ordered by capability
/// Essencial < Agenda < Conversao
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Essencial,
    Agenda,
    Conversao,
}

impl PlanTier {
    /// Capability rank (higher = more capable)
    pub fn rank(&self) -> u8 {
        match self {
            Self::Essencial => 0,
            Self::Agenda => 1,
            Self::Conversao => 2,
        }
    }

    /// The highest tier in the catalog
    pub fn top() -> Self {
        Self::Conversao
    }

    pub fn is_top(&self) -> bool {
        *self == Self::top()
    }

    /// Parse a tier from a string, treating unknown values as "no plan".
    /// Plan values only originate from trusted internal state, so an
    /// unrecognized value falls back to the new-customer path instead of
    /// erroring.
    pub fn parse_lossy(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl PartialOrd for PlanTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PlanTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Essencial => write!(f, "essencial"),
            Self::Agenda => write!(f, "agenda"),
            Self::Conversao => write!(f, "conversao"),
        }
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "essencial" => Ok(Self::Essencial),
            "agenda" => Ok(Self::Agenda),
            "conversao" => Ok(Self::Conversao),
            _ => Err(format!("Invalid plan tier: {}", s)),
        }
    }
}

/// Payment gateway for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gateway {
    Stripe,
    Asaas,
}

impl std::fmt::Display for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stripe => write!(f, "stripe"),
            Self::Asaas => write!(f, "asaas"),
        }
    }
}

impl std::str::FromStr for Gateway {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stripe" => Ok(Self::Stripe),
            "asaas" => Ok(Self::Asaas),
            _ => Err(format!("Invalid gateway: {}", s)),
        }
    }
}

/// Product category: one-time setup fee or recurring monthly fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Activation,
    Subscription,
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Activation => write!(f, "activation"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

/// Billing phase of a payment-tracking record
/// Activation fees are split into two 50% phases; subscriptions bill monthly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentPhase {
    Phase1,
    Phase2,
    Monthly,
}

impl std::fmt::Display for PaymentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Phase1 => write!(f, "phase1"),
            Self::Phase2 => write!(f, "phase2"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for PaymentPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "phase1" => Ok(Self::Phase1),
            "phase2" => Ok(Self::Phase2),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Invalid payment phase: {}", s)),
        }
    }
}

/// Payment status, driven by gateway webhook confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

/// Gateway-mirrored subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Incomplete,
    IncompleteExpired,
    PastDue,
    Trialing,
    Unpaid,
    NotStarted,
}

impl Default for SubscriptionStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Canceled => write!(f, "canceled"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::IncompleteExpired => write!(f, "incomplete_expired"),
            Self::PastDue => write!(f, "past_due"),
            Self::Trialing => write!(f, "trialing"),
            Self::Unpaid => write!(f, "unpaid"),
            Self::NotStarted => write!(f, "not_started"),
        }
    }
}

impl std::str::FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "canceled" => Ok(Self::Canceled),
            "incomplete" => Ok(Self::Incomplete),
            "incomplete_expired" => Ok(Self::IncompleteExpired),
            "past_due" => Ok(Self::PastDue),
            "trialing" => Ok(Self::Trialing),
            "unpaid" => Ok(Self::Unpaid),
            "not_started" => Ok(Self::NotStarted),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

/// Platform role for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Client,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Client
    }
}

impl UserRole {
    /// Parse a role from string (case insensitive)
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "admin" => Self::Admin,
            _ => Self::Client, // Default to client for unknown roles
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Client => write!(f, "client"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "client" => Ok(Self::Client),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

/// Client request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Open
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// =============================================================================
// Database Models
// =============================================================================

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    /// Current plan tier; NULL for users who never completed an activation
    pub plan: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Current plan tier, tolerating unknown values as "no plan"
    pub fn plan_tier(&self) -> Option<PlanTier> {
        self.plan.as_deref().and_then(PlanTier::parse_lossy)
    }
}

/// Payment tracking record
/// Created when a checkout is initiated; status transitions mirror gateway
/// webhook confirmations. Immutable once paid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentTracking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub phase: String,
    pub status: String,
    pub amount_cents: i64,
    pub currency: String,
    pub gateway: String,
    pub idempotency_key: Option<String>,
    pub checkout_url: Option<String>,
    pub due_date: Option<OffsetDateTime>,
    pub paid_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl PaymentTracking {
    pub fn payment_status(&self) -> PaymentStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn payment_phase(&self) -> Option<PaymentPhase> {
        self.phase.parse().ok()
    }
}

/// Gateway-mirrored subscription
/// At most one per user per gateway; lifecycle driven entirely by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gateway: String,
    pub external_subscription_id: Option<String>,
    pub external_customer_id: Option<String>,
    pub status: String,
    pub current_period_start: Option<OffsetDateTime>,
    pub current_period_end: Option<OffsetDateTime>,
    pub cancel_at_period_end: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Subscription {
    pub fn subscription_status(&self) -> SubscriptionStatus {
        self.status.parse().unwrap_or_default()
    }
}

/// Client support request
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub description: String,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Captured lead (marketing site forms)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub source: String,
    pub agent_type: Option<String>,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // PlanTier Tests
    // =========================================================================

    #[test]
    fn test_plan_tier_order() {
        assert!(PlanTier::Essencial < PlanTier::Agenda);
        assert!(PlanTier::Agenda < PlanTier::Conversao);
        assert!(PlanTier::Essencial < PlanTier::Conversao);
        assert_eq!(PlanTier::top(), PlanTier::Conversao);
        assert!(PlanTier::Conversao.is_top());
        assert!(!PlanTier::Agenda.is_top());
    }

    #[test]
    fn test_plan_tier_rank() {
        assert_eq!(PlanTier::Essencial.rank(), 0);
        assert_eq!(PlanTier::Agenda.rank(), 1);
        assert_eq!(PlanTier::Conversao.rank(), 2);
    }

    #[test]
    fn test_plan_tier_display_and_parse() {
        assert_eq!(PlanTier::Essencial.to_string(), "essencial");
        assert_eq!(PlanTier::Conversao.to_string(), "conversao");
        assert_eq!("agenda".parse::<PlanTier>().unwrap(), PlanTier::Agenda);
        assert_eq!("AGENDA".parse::<PlanTier>().unwrap(), PlanTier::Agenda);
        assert!("premium".parse::<PlanTier>().is_err());
    }

    #[test]
    fn test_plan_tier_parse_lossy() {
        assert_eq!(PlanTier::parse_lossy("conversao"), Some(PlanTier::Conversao));
        // Unknown values degrade to "no plan" rather than erroring
        assert_eq!(PlanTier::parse_lossy("enterprise"), None);
        assert_eq!(PlanTier::parse_lossy(""), None);
    }

    #[test]
    fn test_gateway_parse() {
        assert_eq!("stripe".parse::<Gateway>().unwrap(), Gateway::Stripe);
        assert_eq!("Asaas".parse::<Gateway>().unwrap(), Gateway::Asaas);
        assert!("paypal".parse::<Gateway>().is_err());
    }

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_subscription_status_roundtrip() {
        for status in [
            SubscriptionStatus::Active,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Incomplete,
            SubscriptionStatus::IncompleteExpired,
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Trialing,
            SubscriptionStatus::Unpaid,
            SubscriptionStatus::NotStarted,
        ] {
            assert_eq!(
                status.to_string().parse::<SubscriptionStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn test_user_role_from_str_lossy() {
        assert_eq!(UserRole::from_str_lossy("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_str_lossy("ADMIN"), UserRole::Admin);
        assert_eq!(UserRole::from_str_lossy("client"), UserRole::Client);
        assert_eq!(UserRole::from_str_lossy("unknown"), UserRole::Client);
    }

    #[test]
    fn test_user_plan_tier_tolerates_unknown() {
        let now = time::OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            name: None,
            role: "client".to_string(),
            plan: Some("legacy-plan".to_string()),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(user.plan_tier(), None);
    }
}
