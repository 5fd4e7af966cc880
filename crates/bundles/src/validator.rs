//! Structural validation of bundle definitions.
//!
//! Findings are returned as data; the caller decides whether they block a save.

use crate::model::BundleDefinition;

pub const EMPTY_BUNDLE: &str = "Bundle must contain at least one product.";
pub const SELF_REFERENCE: &str = "Bundle cannot contain itself.";

/// Every structural problem with `bundle`, in check order. Empty means valid.
pub fn validate(bundle: &BundleDefinition) -> Vec<String> {
    let mut errors = Vec::new();

    if bundle.linked_product_ids.is_empty() {
        errors.push(EMPTY_BUNDLE.to_string());
    }

    if bundle.contains(bundle.id) {
        errors.push(SELF_REFERENCE.to_string());
    }

    for product_id in &bundle.linked_product_ids {
        match bundle.product_quantities.get(product_id) {
            Some(&q) if q >= 1 => {}
            _ => errors.push(format!(
                "Invalid quantity for product {product_id}: must be at least 1."
            )),
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use bundlestock_core::ProductId;

    fn pid(raw: u64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    fn bundle(id: u64, linked: &[u64], quantities: &[(u64, i64)]) -> BundleDefinition {
        BundleDefinition::new(
            pid(id),
            linked.iter().map(|&l| pid(l)).collect(),
            quantities.iter().map(|&(k, v)| (pid(k), v)).collect(),
        )
    }

    #[test]
    fn valid_bundle_has_no_errors() {
        let b = bundle(100, &[1, 2, 3], &[(1, 2), (2, 1), (3, 3)]);
        assert!(validate(&b).is_empty());
    }

    #[test]
    fn empty_bundle_is_rejected() {
        let errors = validate(&bundle(106, &[], &[]));
        assert_eq!(errors, vec![EMPTY_BUNDLE.to_string()]);
    }

    #[test]
    fn self_reference_is_rejected() {
        let errors = validate(&bundle(107, &[1, 107], &[(1, 1), (107, 1)]));
        assert!(errors.iter().any(|e| e.contains("Bundle cannot contain itself")));
    }

    #[test]
    fn each_non_positive_quantity_is_reported() {
        let errors = validate(&bundle(108, &[1, 2], &[(1, 0), (2, -1)]));
        assert!(errors.contains(&"Invalid quantity for product 1: must be at least 1.".to_string()));
        assert!(errors.contains(&"Invalid quantity for product 2: must be at least 1.".to_string()));
    }

    #[test]
    fn missing_quantity_is_reported() {
        let errors = validate(&bundle(109, &[1, 2], &[(1, 2)]));
        assert_eq!(
            errors,
            vec!["Invalid quantity for product 2: must be at least 1.".to_string()]
        );
    }

    #[test]
    fn all_findings_are_collected_together() {
        // Self-reference with no quantity for itself: two findings, no short-circuit.
        let errors = validate(&bundle(120, &[120], &[]));
        assert_eq!(
            errors,
            vec![
                SELF_REFERENCE.to_string(),
                "Invalid quantity for product 120: must be at least 1.".to_string(),
            ]
        );
    }

    #[test]
    fn quantities_for_unlinked_products_are_ignored() {
        let b = bundle(121, &[1], &[(1, 1), (9, -4)]);
        assert!(validate(&b).is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the validator finds nothing exactly when the definition is well-formed.
            #[test]
            fn no_errors_iff_well_formed(
                id in 1u64..20,
                entries in prop::collection::btree_map(1u64..20, -2i64..4, 0..6),
                unmapped in prop::collection::vec(1u64..20, 0..3),
            ) {
                let mut linked: Vec<u64> = entries.keys().copied().collect();
                linked.extend(unmapped.iter().copied().filter(|u| !entries.contains_key(u)));
                let quantities: Vec<(u64, i64)> = entries.iter().map(|(&k, &v)| (k, v)).collect();
                let b = bundle(id, &linked, &quantities);

                let well_formed = !linked.is_empty()
                    && !linked.contains(&id)
                    && linked.iter().all(|l| entries.get(l).is_some_and(|&q| q >= 1));

                prop_assert_eq!(validate(&b).is_empty(), well_formed);
            }
        }
    }
}
