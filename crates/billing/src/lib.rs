//! Billing for the HumanTic platform
//!
//! Covers the product catalog (plan tier x billing phase x gateway), the
//! upgrade-only entitlement resolver, gateway selection between Stripe and
//! Asaas, hosted checkout creation, the two-phase payment ledger, and the
//! local mirror of gateway subscriptions.

pub mod asaas;
pub mod catalog;
pub mod checkout;
pub mod client;
pub mod entitlement;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod subscription;

pub use asaas::{AsaasClient, AsaasConfig, AsaasPaymentLink};
pub use catalog::{product_by_price_id, products, products_by_category_and_gateway, Product};
pub use checkout::{CheckoutResponse, CheckoutService};
pub use client::{StripeClient, StripeConfig};
pub use entitlement::{is_upgrade, upgrade_options, upgrade_options_lossy};
pub use error::{BillingError, BillingResult};
pub use gateway::GatewaySelection;
pub use ledger::{summarize, LedgerService, LedgerSummary, NewPayment};
pub use subscription::{GatewaySubscriptionUpdate, SubscriptionService};
