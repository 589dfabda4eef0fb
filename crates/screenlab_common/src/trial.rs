//! Trial generation - one simulated baggage scan.
//!
//! A trial is a shuffled bag of distinct safe items, with one threat item
//! inserted at the configured probability. The shuffle is uniform so the
//! threat's position carries no signal.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Item, ItemCatalog};
use crate::config::BagSize;
use crate::error::StudyError;

/// One presented bag and its hidden ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Bag contents in display order
    pub items: Vec<Item>,
    /// Ground truth: whether a threat item is present
    pub has_threat: bool,
}

impl Trial {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Generate one trial.
///
/// Draws a bag size uniformly from `bag_size`, samples that many distinct
/// safe items, then with probability `threat_probability` appends one threat
/// item and shuffles. A safe catalog smaller than the drawn size is a
/// configuration error, never retried.
pub fn generate_trial<R: Rng + ?Sized>(
    rng: &mut R,
    catalog: &ItemCatalog,
    threat_probability: f64,
    bag_size: BagSize,
) -> Result<Trial, StudyError> {
    if !(0.0..=1.0).contains(&threat_probability) {
        return Err(StudyError::Configuration(format!(
            "threat_probability {} outside [0,1]",
            threat_probability
        )));
    }
    if bag_size.min < 1 || bag_size.min > bag_size.max {
        return Err(StudyError::Configuration(format!(
            "bag_size [{},{}] is not a valid range",
            bag_size.min, bag_size.max
        )));
    }

    let k = rng.gen_range(bag_size.min..=bag_size.max);
    if k > catalog.safe.len() {
        return Err(StudyError::Configuration(format!(
            "cannot sample {} distinct items from a safe catalog of {}",
            k,
            catalog.safe.len()
        )));
    }

    let mut items: Vec<Item> = catalog.safe.choose_multiple(rng, k).cloned().collect();

    let has_threat = rng.gen_bool(threat_probability);
    if has_threat {
        let threat = catalog.threat.choose(rng).ok_or_else(|| {
            StudyError::Configuration("threat catalog is empty".to_string())
        })?;
        items.push(threat.clone());
    }

    items.shuffle(rng);

    Ok(Trial { items, has_threat })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn catalog() -> ItemCatalog {
        ItemCatalog::default()
    }

    #[test]
    fn test_bag_size_within_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            let trial = generate_trial(&mut rng, &catalog(), 0.40, BagSize::default()).unwrap();
            let safe_count = trial.len() - usize::from(trial.has_threat);
            assert!((4..=8).contains(&safe_count), "safe count {}", safe_count);
        }
    }

    #[test]
    fn test_no_duplicate_safe_items() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..500 {
            let trial = generate_trial(&mut rng, &catalog(), 0.40, BagSize::default()).unwrap();
            let names: HashSet<&str> = trial.items.iter().map(|i| i.name.as_str()).collect();
            assert_eq!(names.len(), trial.len(), "duplicate item in {:?}", trial);
        }
    }

    #[test]
    fn test_at_most_one_threat_item() {
        let cat = catalog();
        let threat_names: HashSet<&str> = cat.threat.iter().map(|i| i.name.as_str()).collect();
        let mut rng = StdRng::seed_from_u64(13);
        for _ in 0..500 {
            let trial = generate_trial(&mut rng, &cat, 0.40, BagSize::default()).unwrap();
            let threats = trial
                .items
                .iter()
                .filter(|i| threat_names.contains(i.name.as_str()))
                .count();
            assert!(threats <= 1);
            assert_eq!(threats == 1, trial.has_threat);
        }
    }

    #[test]
    fn test_zero_probability_never_inserts_threat() {
        let mut rng = StdRng::seed_from_u64(14);
        for _ in 0..500 {
            let trial = generate_trial(&mut rng, &catalog(), 0.0, BagSize::default()).unwrap();
            assert!(!trial.has_threat);
            assert!((4..=8).contains(&trial.len()));
        }
    }

    #[test]
    fn test_certain_probability_always_inserts_threat() {
        let mut rng = StdRng::seed_from_u64(15);
        for _ in 0..100 {
            let trial = generate_trial(&mut rng, &catalog(), 1.0, BagSize::default()).unwrap();
            assert!(trial.has_threat);
            assert!((5..=9).contains(&trial.len()));
        }
    }

    #[test]
    fn test_undersized_catalog_is_configuration_error() {
        let cat = ItemCatalog {
            safe: catalog().safe.into_iter().take(3).collect(),
            ..ItemCatalog::default()
        };
        let mut rng = StdRng::seed_from_u64(16);
        let err = generate_trial(&mut rng, &cat, 0.40, BagSize::default()).unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
    }

    #[test]
    fn test_out_of_range_probability_is_configuration_error() {
        let mut rng = StdRng::seed_from_u64(17);
        let err = generate_trial(&mut rng, &catalog(), 1.2, BagSize::default()).unwrap_err();
        assert!(matches!(err, StudyError::Configuration(_)));
    }
}
