//! Referral counting

use crate::store::Person;
use std::collections::HashMap;

/// Referral count for every person, zero when nobody named them.
///
/// Referrer ids that match no person are ignored. Output follows the
/// order of `people`.
pub fn referral_counts(people: &[Person]) -> Vec<(String, u64)> {
    let mut referred: HashMap<&str, u64> = HashMap::new();
    for referrer in people.iter().filter_map(Person::referrer_id) {
        *referred.entry(referrer).or_default() += 1;
    }

    people
        .iter()
        .map(|p| (p.id.clone(), referred.get(p.id.as_str()).copied().unwrap_or(0)))
        .collect()
}
