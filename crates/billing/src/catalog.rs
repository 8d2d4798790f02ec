//! Static product catalog
//!
//! Every purchasable item is a (plan tier, category, gateway) combination.
//! Activation products carry the first 50% installment of the setup fee and
//! record the full setup value; subscription products carry the recurring
//! monthly fee. Prices are in BRL cents.

use humantic_shared::types::{Gateway, PlanTier, ProductCategory};

/// A purchasable catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    /// Stable identifier the frontend sends as `priceId`
    pub price_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tier: PlanTier,
    pub category: ProductCategory,
    pub gateway: Gateway,
    /// Amount charged at checkout (first installment or monthly fee)
    pub amount_cents: i64,
    /// Full activation value before the 50/50 split; None for subscriptions
    pub total_value_cents: Option<i64>,
}

impl Product {
    /// Second-installment amount for activation products
    pub fn remainder_cents(&self) -> Option<i64> {
        self.total_value_cents.map(|total| total - self.amount_cents)
    }
}

// Activation fees split 50/50: the checkout charges the first half, the
// ledger schedules the second half once the first is confirmed paid.
const CATALOG: &[Product] = &[
    // ---- Stripe: activation ----
    Product {
        price_id: "essencial-activation-stripe",
        name: "Agente Essencial - Ativacao",
        description: "Taxa de ativacao do Agente Essencial (1a parcela de 2)",
        tier: PlanTier::Essencial,
        category: ProductCategory::Activation,
        gateway: Gateway::Stripe,
        amount_cents: 99_700,
        total_value_cents: Some(199_400),
    },
    Product {
        price_id: "agenda-activation-stripe",
        name: "Agente Agenda - Ativacao",
        description: "Taxa de ativacao do Agente Agenda (1a parcela de 2)",
        tier: PlanTier::Agenda,
        category: ProductCategory::Activation,
        gateway: Gateway::Stripe,
        amount_cents: 149_700,
        total_value_cents: Some(299_400),
    },
    Product {
        price_id: "conversao-activation-stripe",
        name: "Agente Conversao - Ativacao",
        description: "Taxa de ativacao do Agente Conversao (1a parcela de 2)",
        tier: PlanTier::Conversao,
        category: ProductCategory::Activation,
        gateway: Gateway::Stripe,
        amount_cents: 199_700,
        total_value_cents: Some(399_400),
    },
    // ---- Stripe: subscription ----
    Product {
        price_id: "essencial-monthly-stripe",
        name: "Agente Essencial - Mensalidade",
        description: "Assinatura mensal do Agente Essencial",
        tier: PlanTier::Essencial,
        category: ProductCategory::Subscription,
        gateway: Gateway::Stripe,
        amount_cents: 29_700,
        total_value_cents: None,
    },
    Product {
        price_id: "agenda-monthly-stripe",
        name: "Agente Agenda - Mensalidade",
        description: "Assinatura mensal do Agente Agenda",
        tier: PlanTier::Agenda,
        category: ProductCategory::Subscription,
        gateway: Gateway::Stripe,
        amount_cents: 49_700,
        total_value_cents: None,
    },
    Product {
        price_id: "conversao-monthly-stripe",
        name: "Agente Conversao - Mensalidade",
        description: "Assinatura mensal do Agente Conversao",
        tier: PlanTier::Conversao,
        category: ProductCategory::Subscription,
        gateway: Gateway::Stripe,
        amount_cents: 69_700,
        total_value_cents: None,
    },
    // ---- Asaas: activation ----
    Product {
        price_id: "essencial-activation-asaas",
        name: "Agente Essencial - Ativacao",
        description: "Taxa de ativacao do Agente Essencial (1a parcela de 2)",
        tier: PlanTier::Essencial,
        category: ProductCategory::Activation,
        gateway: Gateway::Asaas,
        amount_cents: 99_700,
        total_value_cents: Some(199_400),
    },
    Product {
        price_id: "agenda-activation-asaas",
        name: "Agente Agenda - Ativacao",
        description: "Taxa de ativacao do Agente Agenda (1a parcela de 2)",
        tier: PlanTier::Agenda,
        category: ProductCategory::Activation,
        gateway: Gateway::Asaas,
        amount_cents: 149_700,
        total_value_cents: Some(299_400),
    },
    Product {
        price_id: "conversao-activation-asaas",
        name: "Agente Conversao - Ativacao",
        description: "Taxa de ativacao do Agente Conversao (1a parcela de 2)",
        tier: PlanTier::Conversao,
        category: ProductCategory::Activation,
        gateway: Gateway::Asaas,
        amount_cents: 199_700,
        total_value_cents: Some(399_400),
    },
    // ---- Asaas: subscription ----
    Product {
        price_id: "essencial-monthly-asaas",
        name: "Agente Essencial - Mensalidade",
        description: "Assinatura mensal do Agente Essencial",
        tier: PlanTier::Essencial,
        category: ProductCategory::Subscription,
        gateway: Gateway::Asaas,
        amount_cents: 29_700,
        total_value_cents: None,
    },
    Product {
        price_id: "agenda-monthly-asaas",
        name: "Agente Agenda - Mensalidade",
        description: "Assinatura mensal do Agente Agenda",
        tier: PlanTier::Agenda,
        category: ProductCategory::Subscription,
        gateway: Gateway::Asaas,
        amount_cents: 49_700,
        total_value_cents: None,
    },
    Product {
        price_id: "conversao-monthly-asaas",
        name: "Agente Conversao - Mensalidade",
        description: "Assinatura mensal do Agente Conversao",
        tier: PlanTier::Conversao,
        category: ProductCategory::Subscription,
        gateway: Gateway::Asaas,
        amount_cents: 69_700,
        total_value_cents: None,
    },
];

/// All catalog entries, in catalog order
pub fn products() -> &'static [Product] {
    CATALOG
}

/// Catalog entries for a category on a gateway, in catalog order
pub fn products_by_category_and_gateway(
    category: ProductCategory,
    gateway: Gateway,
) -> Vec<&'static Product> {
    CATALOG
        .iter()
        .filter(|p| p.category == category && p.gateway == gateway)
        .collect()
}

/// Look up a product by its price id
pub fn product_by_price_id(price_id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.price_id == price_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_covers_every_combination() {
        for gateway in [Gateway::Stripe, Gateway::Asaas] {
            for category in [ProductCategory::Activation, ProductCategory::Subscription] {
                let found = products_by_category_and_gateway(category, gateway);
                assert_eq!(found.len(), 3, "{category} on {gateway}");
                let tiers: HashSet<_> = found.iter().map(|p| p.tier).collect();
                assert_eq!(tiers.len(), 3);
            }
        }
    }

    #[test]
    fn test_price_ids_unique() {
        let ids: HashSet<_> = products().iter().map(|p| p.price_id).collect();
        assert_eq!(ids.len(), products().len());
    }

    #[test]
    fn test_activation_split_is_half_of_total() {
        for product in products() {
            match product.category {
                ProductCategory::Activation => {
                    let total = product.total_value_cents.unwrap();
                    assert_eq!(product.amount_cents * 2, total, "{}", product.price_id);
                    assert_eq!(product.remainder_cents(), Some(product.amount_cents));
                }
                ProductCategory::Subscription => {
                    assert!(product.total_value_cents.is_none());
                    assert!(product.remainder_cents().is_none());
                }
            }
        }
    }

    #[test]
    fn test_same_tier_priced_identically_across_gateways() {
        for stripe_product in products_by_category_and_gateway(
            ProductCategory::Activation,
            Gateway::Stripe,
        ) {
            let asaas_product = products()
                .iter()
                .find(|p| {
                    p.gateway == Gateway::Asaas
                        && p.tier == stripe_product.tier
                        && p.category == stripe_product.category
                })
                .unwrap();
            assert_eq!(stripe_product.amount_cents, asaas_product.amount_cents);
        }
    }

    #[test]
    fn test_product_lookup() {
        let product = product_by_price_id("agenda-activation-stripe").unwrap();
        assert_eq!(product.tier, PlanTier::Agenda);
        assert_eq!(product.gateway, Gateway::Stripe);
        assert!(product_by_price_id("nonexistent").is_none());
    }
}
