//! Upgrade entitlement resolution
//!
//! Plan changes are upgrade-only: a user may buy any activation whose tier
//! strictly outranks their current plan. Users without a plan (or with an
//! unrecognized plan value) see the full activation catalog.

use humantic_shared::types::{PlanTier, ProductCategory};

use crate::catalog::{self, Product};

/// True if moving to `target` from `current` is a strict upgrade
pub fn is_upgrade(current: Option<PlanTier>, target: PlanTier) -> bool {
    match current {
        None => true,
        Some(current) => target > current,
    }
}

/// Activation products the user is entitled to buy, across both gateways,
/// in catalog order
pub fn upgrade_options(current: Option<PlanTier>) -> Vec<&'static Product> {
    catalog::products()
        .iter()
        .filter(|p| p.category == ProductCategory::Activation && is_upgrade(current, p.tier))
        .collect()
}

/// Same as [`upgrade_options`] but takes the raw stored plan value.
/// Unrecognized values resolve to the new-customer path.
pub fn upgrade_options_lossy(current: Option<&str>) -> Vec<&'static Product> {
    upgrade_options(current.and_then(PlanTier::parse_lossy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use humantic_shared::types::Gateway;

    #[test]
    fn test_no_plan_sees_full_activation_catalog() {
        let options = upgrade_options(None);
        assert_eq!(options.len(), 6);
        assert!(options.iter().all(|p| p.category == ProductCategory::Activation));
        assert!(options.iter().any(|p| p.gateway == Gateway::Stripe));
        assert!(options.iter().any(|p| p.gateway == Gateway::Asaas));
    }

    #[test]
    fn test_essencial_sees_only_higher_tiers() {
        let options = upgrade_options(Some(PlanTier::Essencial));
        assert_eq!(options.len(), 4);
        assert!(options.iter().all(|p| p.tier > PlanTier::Essencial));
    }

    #[test]
    fn test_agenda_sees_only_conversao() {
        let options = upgrade_options(Some(PlanTier::Agenda));
        assert_eq!(options.len(), 2);
        assert!(options.iter().all(|p| p.tier == PlanTier::Conversao));
    }

    #[test]
    fn test_top_tier_sees_nothing() {
        assert!(upgrade_options(Some(PlanTier::Conversao)).is_empty());
    }

    #[test]
    fn test_options_never_include_current_or_lower() {
        for current in [PlanTier::Essencial, PlanTier::Agenda, PlanTier::Conversao] {
            for product in upgrade_options(Some(current)) {
                assert!(product.tier > current);
            }
        }
    }

    #[test]
    fn test_unrecognized_plan_falls_back_to_new_customer() {
        let options = upgrade_options_lossy(Some("legacy-gold"));
        assert_eq!(options.len(), upgrade_options(None).len());
    }

    #[test]
    fn test_is_upgrade() {
        assert!(is_upgrade(None, PlanTier::Essencial));
        assert!(is_upgrade(Some(PlanTier::Essencial), PlanTier::Agenda));
        assert!(!is_upgrade(Some(PlanTier::Agenda), PlanTier::Agenda));
        assert!(!is_upgrade(Some(PlanTier::Conversao), PlanTier::Essencial));
    }
}
