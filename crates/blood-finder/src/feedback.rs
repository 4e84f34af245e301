/// Sentences for audio playback.
use crate::model::{HospitalRecord, SearchCriteria};

/// Groups above this many units are read out for a single hospital.
pub const NOTABLE_STOCK_UNITS: u32 = 5;

pub const VOICE_PROMPT: &str = "Please say the blood group and location you need";

pub const NO_RESULTS: &str =
    "No hospitals found with the specified criteria. Please try different filters.";

pub fn summarize_results(count: usize, criteria: &SearchCriteria) -> String {
    if count == 0 {
        return NO_RESULTS.to_string();
    }
    let group = criteria
        .blood_group
        .map(|g| g.code())
        .unwrap_or("blood");
    let location = criteria.location.as_deref().unwrap_or("your area");
    format!("Found {count} hospitals with available {group} in {location}")
}

pub fn read_results(count: usize) -> String {
    if count == 0 {
        return NO_RESULTS.to_string();
    }
    format!("Found {count} hospitals")
}

pub fn describe_hospital(record: &HospitalRecord, threshold: u32) -> String {
    let notable: Vec<&str> = record
        .blood_stock
        .iter()
        .filter(|&(_, units)| units > threshold)
        .map(|(group, _)| group.code())
        .collect();
    if notable.is_empty() {
        return format!(
            "{} in {}. No blood group currently has significant stock",
            record.name, record.location
        );
    }
    format!(
        "{} in {}. Available blood groups: {}",
        record.name,
        record.location,
        notable.join(", ")
    )
}
