use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct InterpretQueryParams {
    /// A typed or transcribed phrase such as "need O positive blood in Pune".
    pub transcript: String,
    /// Maximum number of hospitals to return (default: all matches).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SetFiltersParams {
    /// Location substring, e.g. "Delhi". A blank value clears the filter.
    pub location: Option<String>,
    /// Blood group code such as "AB-" or a spoken form such as "ab negative".
    pub blood_group: Option<String>,
    /// Urgency level: Low, Medium, High or Critical.
    pub urgency: Option<String>,
    /// Remove the location filter.
    #[serde(default)]
    pub clear_location: bool,
    /// Remove the blood group filter.
    #[serde(default)]
    pub clear_blood_group: bool,
    /// Remove the urgency filter.
    #[serde(default)]
    pub clear_urgency: bool,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchHospitalsParams {
    /// Maximum number of hospitals to return (default: all matches).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DescribeHospitalParams {
    /// Catalog id of the hospital.
    pub hospital_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StockEntry {
    pub blood_group: String,
    pub units: u32,
    /// One of "critical", "moderate" or "healthy".
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HospitalSummary {
    pub id: u32,
    pub name: String,
    pub location: String,
    pub blood_stock: Vec<StockEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CriteriaInfo {
    pub location: Option<String>,
    pub blood_group: Option<String>,
    pub urgency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeltaInfo {
    pub blood_group: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InterpretQueryResponse {
    /// Fields detected in the transcript.
    pub delta: DeltaInfo,
    /// False when the delta was discarded as stale.
    pub applied: bool,
    pub criteria: CriteriaInfo,
    pub total_matches: usize,
    pub hospitals: Vec<HospitalSummary>,
    /// True when an urgency filter is set; the catalog carries no urgency data.
    pub urgency_ignored: bool,
    /// Sentence for audio playback.
    pub utterance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHospitalsResponse {
    pub criteria: CriteriaInfo,
    pub total_matches: usize,
    pub hospitals: Vec<HospitalSummary>,
    pub urgency_ignored: bool,
    pub utterance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FiltersResponse {
    pub criteria: CriteriaInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HospitalDetailResponse {
    pub hospital: HospitalSummary,
    pub utterance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UtteranceResponse {
    pub utterance: String,
}
