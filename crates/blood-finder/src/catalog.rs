/// Read-only hospital inventory catalog.
///
/// Records keep the order of the source document. The catalog is shared by
/// every search session, so it is backed by an `Arc<[HospitalRecord]>` and
/// cloned by reference count.
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppError;
use crate::model::HospitalRecord;
use mcp_common::error::CommonError;

const SAMPLE_CATALOG: &str = include_str!("../data/hospitals.json");

#[derive(Debug, Clone)]
pub struct Catalog {
    records: Arc<[HospitalRecord]>,
}

impl Catalog {
    pub fn new(records: Vec<HospitalRecord>) -> Result<Self, AppError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                return Err(AppError::DuplicateHospital(record.id));
            }
        }
        Ok(Self {
            records: records.into(),
        })
    }

    /// Parse a JSON array of hospital records.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let records: Vec<HospitalRecord> =
            serde_json::from_str(json).map_err(CommonError::from)?;
        Self::new(records)
    }

    /// Read failures carry the path; parse failures keep the JSON error.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| CommonError::io(path.display().to_string(), e))?;
        let catalog = Self::from_json(&json).inspect_err(|e| {
            warn!(path = %path.display(), error = %e, "catalog rejected");
        })?;
        info!(path = %path.display(), hospitals = catalog.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The dataset bundled with the binary.
    pub fn sample() -> Result<Self, AppError> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn records(&self) -> &[HospitalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&HospitalRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Distinct lower-cased place names, in catalog order.
    ///
    /// Locations such as "Parel, Mumbai" contribute each comma-separated part.
    pub fn locations(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for record in self.records.iter() {
            for part in record.location.split(',') {
                let place = part.trim().to_lowercase();
                if !place.is_empty() && seen.insert(place.clone()) {
                    out.push(place);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::model::BloodGroup;

    #[test]
    fn sample_catalog_loads() {
        let catalog = Catalog::sample().expect("bundled catalog parses");
        assert!(catalog.len() >= 8);
        let aiims = catalog.get(1).expect("AIIMS present");
        assert_eq!(aiims.name, "AIIMS");
        assert!(aiims.blood_stock.get(BloodGroup::OPositive) > 0);
    }

    #[test]
    fn empty_array_is_an_empty_catalog() {
        let catalog = Catalog::from_json("[]").unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.locations().is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": 1, "name": "A", "location": "Delhi"},
            {"id": 1, "name": "B", "location": "Pune"}
        ]"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, AppError::DuplicateHospital(1)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Catalog::from_json("{not json").unwrap_err(),
            AppError::Common(CommonError::Json(_))
        ));
    }

    #[test]
    fn locations_split_on_commas_and_dedupe() {
        let json = r#"[
            {"id": 1, "name": "A", "location": "Parel, Mumbai"},
            {"id": 2, "name": "B", "location": "Mumbai"}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.locations(), vec!["parel", "mumbai"]);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = Catalog::load(Path::new("/nonexistent/hospitals.json")).unwrap_err();
        assert!(matches!(err, AppError::Common(CommonError::Io { .. })));
        assert!(err.to_string().contains("/nonexistent/hospitals.json"));
    }

    #[test]
    fn load_reads_catalog_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 3, "name": "Ruby Hall", "location": "Pune", "blood_stock": {{"O+": 4}}}},
                {{"id": 9, "name": "KEM", "location": "Parel, Mumbai"}}
            ]"#
        )
        .unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(3).unwrap().blood_stock.get(BloodGroup::OPositive), 4);
        assert_eq!(catalog.locations(), vec!["pune", "parel", "mumbai"]);
    }

    #[test]
    fn load_keeps_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[{{\"id\": 1,").unwrap();
        assert!(matches!(
            Catalog::load(file.path()).unwrap_err(),
            AppError::Common(CommonError::Json(_))
        ));
    }
}
