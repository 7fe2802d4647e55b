//! Live parameter values for the active filter.
//!
//! A [`ParameterSet`] is rebuilt from scratch whenever the filter selection
//! changes — values are seeded to each range's midpoint, never carried over
//! from the previous filter. Every write clamps into the declared range, so
//! a stored value is in range at all times, not just at construction.

use crate::catalog::{FilterDefinition, ParameterSpec};

/// One live value paired with its schema.
#[derive(Debug, Clone, Copy)]
pub struct ParameterValue {
    pub spec: &'static ParameterSpec,
    pub value: f64,
}

/// The mutable parameter collection for the currently selected filter.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    values: Vec<ParameterValue>,
}

impl ParameterSet {
    /// The empty set, used while the sentinel filter is active.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed every declared parameter of `def` to its midpoint default.
    pub fn seeded(def: &'static FilterDefinition) -> Self {
        Self {
            values: def
                .params
                .iter()
                .map(|spec| ParameterValue {
                    spec,
                    value: spec.midpoint(),
                })
                .collect(),
        }
    }

    /// Write a parameter by name, clamping into its range.
    ///
    /// Returns `false` if no parameter with that name exists on the active
    /// filter; the set is left untouched. Callers log and carry on — an
    /// unknown name is deliberately not an error.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match self.values.iter_mut().find(|pv| pv.spec.name == name) {
            Some(pv) => {
                pv.value = pv.spec.clamp(value);
                true
            }
            None => false,
        }
    }

    /// Current value of a parameter, if declared.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|pv| pv.spec.name == name)
            .map(|pv| pv.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterValue> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    #[test]
    fn seeded_uses_midpoints() {
        let set = ParameterSet::seeded(catalog::resolve("Vignette"));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("intensity"), Some(1.0));
        assert_eq!(set.get("radius"), Some(100.5));
    }

    #[test]
    fn seeded_from_sentinel_is_empty() {
        let set = ParameterSet::seeded(catalog::none());
        assert!(set.is_empty());
    }

    #[test]
    fn set_clamps_into_range() {
        let mut set = ParameterSet::seeded(catalog::resolve("Gaussian Blur"));
        assert!(set.set("radius", -50.0));
        assert_eq!(set.get("radius"), Some(1.0));
        assert!(set.set("radius", 1e6));
        assert_eq!(set.get("radius"), Some(200.0));
        assert!(set.set("radius", 12.5));
        assert_eq!(set.get("radius"), Some(12.5));
    }

    #[test]
    fn unknown_name_is_rejected_and_harmless() {
        let mut set = ParameterSet::seeded(catalog::resolve("Sepia Tone"));
        assert!(!set.set("radius", 10.0));
        assert_eq!(set.get("intensity"), Some(0.5));
        assert_eq!(set.get("radius"), None);
    }
}
