/// Filters the catalog against a session's criteria.
///
/// Filters combine with AND; unset fields impose no constraint. Results keep
/// catalog order, there is no scoring. The catalog carries no urgency data,
/// so an urgency filter is reported back as ignored rather than applied.
use tracing::info;

use crate::catalog::Catalog;
use crate::model::{HospitalRecord, SearchCriteria};

pub fn find_matches<'a>(
    records: &'a [HospitalRecord],
    criteria: &SearchCriteria,
) -> Vec<&'a HospitalRecord> {
    let location = criteria.location.as_ref().map(|l| l.to_lowercase());
    records
        .iter()
        .filter(|record| match &location {
            Some(needle) => record.location.to_lowercase().contains(needle.as_str()),
            None => true,
        })
        .filter(|record| match criteria.blood_group {
            Some(group) => record.blood_stock.get(group) > 0,
            None => true,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct MatchReport<'a> {
    pub hospitals: Vec<&'a HospitalRecord>,
    /// Set when the criteria carried an urgency level that could not be applied.
    pub urgency_ignored: bool,
}

impl MatchReport<'_> {
    pub fn count(&self) -> usize {
        self.hospitals.len()
    }
}

#[derive(Debug, Clone)]
pub struct SearchEngine {
    catalog: Catalog,
}

impl SearchEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn search(&self, criteria: &SearchCriteria) -> MatchReport<'_> {
        let hospitals = find_matches(self.catalog.records(), criteria);
        info!(
            location = ?criteria.location,
            blood_group = ?criteria.blood_group,
            matches = hospitals.len(),
            "catalog searched"
        );
        MatchReport {
            hospitals,
            urgency_ignored: criteria.urgency.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BloodGroup, BloodStock, UrgencyLevel};

    fn record(id: u32, name: &str, location: &str, stock: &[(BloodGroup, u32)]) -> HospitalRecord {
        HospitalRecord {
            id,
            name: name.to_string(),
            location: location.to_string(),
            blood_stock: stock.iter().copied().collect::<BloodStock>(),
        }
    }

    fn fixture() -> Vec<HospitalRecord> {
        vec![
            record(1, "AIIMS", "New Delhi", &[(BloodGroup::OPositive, 12), (BloodGroup::APositive, 3)]),
            record(2, "KEM", "Mumbai", &[(BloodGroup::OPositive, 0), (BloodGroup::BNegative, 4)]),
            record(3, "Safdarjung", "Delhi", &[(BloodGroup::ANegative, 1)]),
        ]
    }

    fn ids(matches: &[&HospitalRecord]) -> Vec<u32> {
        matches.iter().map(|r| r.id).collect()
    }

    #[test]
    fn unset_criteria_is_identity() {
        let records = fixture();
        let matches = find_matches(&records, &SearchCriteria::default());
        assert_eq!(ids(&matches), vec![1, 2, 3]);
    }

    #[test]
    fn location_is_case_insensitive_substring() {
        let records = fixture();
        let criteria = SearchCriteria {
            location: Some("DELHI".into()),
            ..Default::default()
        };
        assert_eq!(ids(&find_matches(&records, &criteria)), vec![1, 3]);
    }

    #[test]
    fn zero_stock_excludes_hospital() {
        let records = fixture();
        let criteria = SearchCriteria {
            blood_group: Some(BloodGroup::OPositive),
            ..Default::default()
        };
        assert_eq!(ids(&find_matches(&records, &criteria)), vec![1]);
    }

    #[test]
    fn filters_combine_with_and() {
        let records = fixture();
        let criteria = SearchCriteria {
            location: Some("delhi".into()),
            blood_group: Some(BloodGroup::ANegative),
            urgency: None,
        };
        assert_eq!(ids(&find_matches(&records, &criteria)), vec![3]);
    }

    #[test]
    fn group_with_no_stock_anywhere_is_empty_not_error() {
        let records = fixture();
        let criteria = SearchCriteria {
            blood_group: Some(BloodGroup::AbNegative),
            ..Default::default()
        };
        assert!(find_matches(&records, &criteria).is_empty());
    }

    #[test]
    fn matching_is_idempotent() {
        let records = fixture();
        let criteria = SearchCriteria {
            location: Some("i".into()),
            blood_group: Some(BloodGroup::APositive),
            urgency: None,
        };
        let first = ids(&find_matches(&records, &criteria));
        let second = ids(&find_matches(&records, &criteria));
        assert_eq!(first, second);
    }

    #[test]
    fn empty_catalog_yields_empty_result() {
        let criteria = SearchCriteria {
            blood_group: Some(BloodGroup::OPositive),
            ..Default::default()
        };
        assert!(find_matches(&[], &criteria).is_empty());
        assert!(find_matches(&[], &SearchCriteria::default()).is_empty());
    }

    #[test]
    fn urgency_is_reported_not_applied() {
        let engine = SearchEngine::new(Catalog::new(fixture()).unwrap());
        let criteria = SearchCriteria {
            urgency: Some(UrgencyLevel::Critical),
            ..Default::default()
        };
        let report = engine.search(&criteria);
        assert_eq!(report.count(), 3);
        assert!(report.urgency_ignored);
        assert!(!engine.search(&SearchCriteria::default()).urgency_ignored);
    }
}
