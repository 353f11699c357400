//! Default practice catalog and catalog editing.
//!
//! The catalog is the only mutator of practice items. Edits that would break
//! an invariant are rejected and leave the catalog untouched.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Cached default catalog - built once and reused
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds an owned copy of the default catalog
pub fn build_default_catalog() -> Catalog {
    DEFAULT_CATALOG.clone()
}

fn build_default_catalog_internal() -> Catalog {
    let items = [
        ("bastrika", "Bastrika", 180),
        ("kapalabhathi", "Kapalabhathi", 300),
        ("sheetali", "Sheetali", 120),
        ("ujjayi", "Ujjayi", 120),
        ("bahya_kumbaka", "Bahya Kumbaka", 60),
        ("anuloma_viloma", "Anuloma Viloma", 600),
        ("bhramari", "Bhramari", 180),
        ("udgeetha", "Udgeetha", 180),
        ("pranava", "Pranava", 120),
    ]
    .into_iter()
    .map(|(id, name, secs)| PracticeItem::new(id, name, secs))
    .collect();

    Catalog { items }
}

impl Catalog {
    /// Find an item by id, falling back to a case-insensitive name match
    pub fn find(&self, key: &str) -> Option<&PracticeItem> {
        self.position(key).map(|idx| &self.items[idx])
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.id == key)
            .or_else(|| {
                self.items
                    .iter()
                    .position(|i| i.name.eq_ignore_ascii_case(key.trim()))
            })
    }

    /// Enable or disable a single item
    pub fn set_active(&mut self, key: &str, active: bool) -> Result<()> {
        let idx = self
            .position(key)
            .ok_or_else(|| Error::UnknownItem(key.to_string()))?;
        self.items[idx].active = active;
        tracing::debug!("Set '{}' active={}", self.items[idx].id, active);
        Ok(())
    }

    /// Enable or disable every item
    pub fn set_all_active(&mut self, active: bool) {
        for item in &mut self.items {
            item.active = active;
        }
        tracing::debug!("Set all {} items active={}", self.items.len(), active);
    }

    /// Change an item's duration.
    ///
    /// Values outside `1..=MAX_DURATION_SECONDS` are rejected with
    /// `InvalidDuration` and the stored duration is left as it was.
    pub fn set_duration(&mut self, key: &str, seconds: i64) -> Result<()> {
        let idx = self
            .position(key)
            .ok_or_else(|| Error::UnknownItem(key.to_string()))?;

        let valid = u32::try_from(seconds)
            .ok()
            .filter(|s| (1..=MAX_DURATION_SECONDS).contains(s));
        let Some(seconds_u32) = valid else {
            tracing::debug!(
                "Rejected duration {} for '{}'",
                seconds,
                self.items[idx].id
            );
            return Err(Error::InvalidDuration {
                id: self.items[idx].id.clone(),
                seconds,
            });
        };

        self.items[idx].duration_seconds = seconds_u32;
        Ok(())
    }

    /// Snapshot the active items for a new session
    pub fn session_queue(&self) -> Result<SessionQueue> {
        SessionQueue::from_active(&self.items)
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|i| i.active).count()
    }

    /// Total exercise time of the active selection
    pub fn total_active_seconds(&self) -> u32 {
        sum_seconds(self.items.iter().filter(|i| i.active))
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        if self.items.is_empty() {
            errors.push("Catalog has no exercises".to_string());
        }

        for item in &self.items {
            if item.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if !seen.insert(item.id.as_str()) {
                errors.push(format!("Duplicate exercise ID '{}'", item.id));
            }
            if item.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", item.id));
            }
            if item.duration_seconds == 0 {
                errors.push(format!("Exercise '{}' has zero duration", item.id));
            }
            if item.duration_seconds > MAX_DURATION_SECONDS {
                errors.push(format!("Exercise '{}' is longer than a day", item.id));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.items.len(), 9);
        assert_eq!(catalog.active_count(), 9);
        assert_eq!(catalog.items[0].name, "Bastrika");
        assert_eq!(catalog.items[8].name, "Pranava");
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = build_default_catalog().validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_default_total_duration() {
        // 33 minutes with everything enabled
        assert_eq!(get_default_catalog().total_active_seconds(), 1980);
    }

    #[test]
    fn test_find_by_id_or_name() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.find("anuloma_viloma").unwrap().duration_seconds, 600);
        assert_eq!(catalog.find("anuloma viloma").unwrap().id, "anuloma_viloma");
        assert!(catalog.find("nadi shodhana").is_none());
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let mut catalog = build_default_catalog();
        for bad in [0, -1, -600, i64::MIN] {
            let err = catalog.set_duration("ujjayi", bad).unwrap_err();
            assert!(matches!(err, Error::InvalidDuration { .. }));
            assert_eq!(catalog.find("ujjayi").unwrap().duration_seconds, 120);
        }
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let mut catalog = build_default_catalog();
        assert!(catalog.set_duration("ujjayi", i64::MAX).is_err());
        assert!(catalog
            .set_duration("ujjayi", i64::from(MAX_DURATION_SECONDS) + 1)
            .is_err());
        assert_eq!(catalog.find("ujjayi").unwrap().duration_seconds, 120);

        catalog
            .set_duration("ujjayi", i64::from(MAX_DURATION_SECONDS))
            .unwrap();
        assert_eq!(
            catalog.find("ujjayi").unwrap().duration_seconds,
            MAX_DURATION_SECONDS
        );
    }

    #[test]
    fn test_huge_durations_do_not_overflow_total() {
        let mut catalog = build_default_catalog();
        assert!(catalog.set_duration("bastrika", 4_000_000_000).is_err());
        assert!(catalog.set_duration("pranava", 4_000_000_000).is_err());
        assert_eq!(catalog.total_active_seconds(), 1980);

        // A hand-edited file can still carry oversized values
        catalog.items[0].duration_seconds = u32::MAX;
        catalog.items[1].duration_seconds = u32::MAX;
        assert_eq!(catalog.total_active_seconds(), u32::MAX);
        assert!(!catalog.validate().is_empty());
    }

    #[test]
    fn test_positive_duration_accepted() {
        let mut catalog = build_default_catalog();
        catalog.set_duration("Ujjayi", 90).unwrap();
        assert_eq!(catalog.find("ujjayi").unwrap().duration_seconds, 90);
    }

    #[test]
    fn test_unknown_item() {
        let mut catalog = build_default_catalog();
        assert!(matches!(
            catalog.set_active("nope", false),
            Err(Error::UnknownItem(_))
        ));
    }

    #[test]
    fn test_toggle_and_queue() {
        let mut catalog = build_default_catalog();
        catalog.set_all_active(false);
        assert!(matches!(catalog.session_queue(), Err(Error::NoActiveItems)));

        catalog.set_active("sheetali", true).unwrap();
        catalog.set_active("bastrika", true).unwrap();
        let queue = catalog.session_queue().unwrap();
        // Catalog order, not toggle order
        assert_eq!(queue.item_names(), vec!["Bastrika", "Sheetali"]);
        assert_eq!(catalog.total_active_seconds(), 300);
    }

    #[test]
    fn test_validate_flags_bad_items() {
        let catalog = Catalog {
            items: vec![
                PracticeItem::new("a", "A", 0),
                PracticeItem::new("a", "", 10),
            ],
        };
        let errors = catalog.validate();
        assert_eq!(errors.len(), 3);
    }
}
