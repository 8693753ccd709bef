//! Intent classification over the latest user utterance.
//!
//! Three keyword groups, checked in a fixed order; the first group with a
//! substring hit decides. The order is a tie-break: "港澳的三甲医院" asks
//! for Tier-A hospitals, not policy-designated ones.

use baymed_core::{FacilityRecord, FilterCategory};

const TIER_A_KEYWORDS: &[&str] = &["三甲", "公立"];
const POLICY_KEYWORDS: &[&str] = &["港澳", "药械通", "医疗券"];
const PRIVATE_KEYWORDS: &[&str] = &["私立", "诊所"];

/// Classify an utterance. Case-sensitive substring containment.
pub fn classify(utterance: &str) -> FilterCategory {
    let hit = |keywords: &[&str]| keywords.iter().any(|k| utterance.contains(k));

    if hit(TIER_A_KEYWORDS) {
        FilterCategory::TierA
    } else if hit(POLICY_KEYWORDS) {
        FilterCategory::PolicyDesignated
    } else if hit(PRIVATE_KEYWORDS) {
        FilterCategory::PrivateOrClinic
    } else {
        FilterCategory::None
    }
}

/// Records matching `category`; the input unchanged for [`FilterCategory::None`].
///
/// A category with no matching records yields an empty vector rather than
/// falling back to the full set.
pub fn filter(records: &[FacilityRecord], category: FilterCategory) -> Vec<FacilityRecord> {
    match category.category() {
        None => records.to_vec(),
        Some(wanted) => records
            .iter()
            .filter(|r| r.category == wanted)
            .cloned()
            .collect(),
    }
}
