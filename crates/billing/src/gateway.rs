//! Gateway selection
//!
//! The purchase flow asks the customer to pick a gateway before any product
//! is shown. No gateway is preselected, the choice can be cleared, and
//! nothing is purchasable while the selection is empty.

use humantic_shared::types::{Gateway, PlanTier, ProductCategory};

use crate::catalog::{self, Product};
use crate::entitlement;

/// Customer-facing gateway choice for a purchase flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewaySelection {
    selected: Option<Gateway>,
}

impl GatewaySelection {
    /// Start with no gateway selected
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, gateway: Gateway) {
        self.selected = Some(gateway);
    }

    /// Return to the unselected state
    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn gateway(&self) -> Option<Gateway> {
        self.selected
    }

    pub fn is_selected(&self) -> bool {
        self.selected.is_some()
    }

    /// Products visible for a category, None while no gateway is selected
    pub fn visible_products(&self, category: ProductCategory) -> Option<Vec<&'static Product>> {
        self.selected
            .map(|gateway| catalog::products_by_category_and_gateway(category, gateway))
    }

    /// Activation upgrades visible for the current plan, None while no
    /// gateway is selected
    pub fn visible_upgrades(&self, current: Option<PlanTier>) -> Option<Vec<&'static Product>> {
        self.selected.map(|gateway| {
            entitlement::upgrade_options(current)
                .into_iter()
                .filter(|p| p.gateway == gateway)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unselected() {
        let selection = GatewaySelection::new();
        assert!(!selection.is_selected());
        assert_eq!(selection.gateway(), None);
        assert_eq!(selection.visible_products(ProductCategory::Activation), None);
    }

    #[test]
    fn test_select_and_clear() {
        let mut selection = GatewaySelection::new();
        selection.select(Gateway::Asaas);
        assert_eq!(selection.gateway(), Some(Gateway::Asaas));

        selection.select(Gateway::Stripe);
        assert_eq!(selection.gateway(), Some(Gateway::Stripe));

        selection.clear();
        assert!(!selection.is_selected());
        assert_eq!(selection.visible_upgrades(None), None);
    }

    #[test]
    fn test_visible_products_match_gateway() {
        let mut selection = GatewaySelection::new();
        selection.select(Gateway::Stripe);

        let products = selection
            .visible_products(ProductCategory::Subscription)
            .unwrap();
        assert_eq!(products.len(), 3);
        assert!(products.iter().all(|p| p.gateway == Gateway::Stripe));
    }

    #[test]
    fn test_agenda_on_stripe_sees_exactly_conversao_activation() {
        let mut selection = GatewaySelection::new();
        selection.select(Gateway::Stripe);

        let upgrades = selection.visible_upgrades(Some(PlanTier::Agenda)).unwrap();
        assert_eq!(upgrades.len(), 1);
        assert_eq!(upgrades[0].price_id, "conversao-activation-stripe");
        assert_eq!(upgrades[0].category, ProductCategory::Activation);
    }

    #[test]
    fn test_visible_upgrades_filter_by_gateway_and_tier() {
        let mut selection = GatewaySelection::new();
        selection.select(Gateway::Asaas);

        let upgrades = selection.visible_upgrades(Some(PlanTier::Essencial)).unwrap();
        assert_eq!(upgrades.len(), 2);
        assert!(upgrades
            .iter()
            .all(|p| p.gateway == Gateway::Asaas && p.tier > PlanTier::Essencial));
    }
}
