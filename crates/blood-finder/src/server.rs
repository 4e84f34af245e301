/// MCP server implementation for the blood availability directory.
///
/// Exposes six tools:
/// - `interpret_query`: Parse a typed or spoken phrase into filters and search
/// - `set_filters`: Edit individual filters directly
/// - `clear_filters`: Reset all filters
/// - `search_hospitals`: Search with the current filters
/// - `describe_hospital`: Spoken summary of one hospital's stock
/// - `read_results`: Short spoken count for the current filters
use std::sync::Arc;

use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::criteria::{OrderingPolicy, SearchSession};
use crate::feedback;
use crate::model::{BloodGroup, HospitalRecord, SearchCriteria, StockLevel, UrgencyLevel};
use crate::pipeline::Pipeline;
use mcp_common::mcp_api::{
    CriteriaInfo, DeltaInfo, DescribeHospitalParams, FiltersResponse, HospitalDetailResponse,
    HospitalSummary, InterpretQueryParams, InterpretQueryResponse, SearchHospitalsParams,
    SearchHospitalsResponse, SetFiltersParams, StockEntry, UtteranceResponse,
};

/// One MCP connection. The pipeline and catalog are shared between
/// connections; the session is not.
#[derive(Clone)]
pub struct BloodFinderServer {
    pipeline: Arc<Pipeline>,
    ordering: OrderingPolicy,
    session: Arc<Mutex<SearchSession>>,
    tool_router: ToolRouter<BloodFinderServer>,
}

impl BloodFinderServer {
    pub fn new(pipeline: Arc<Pipeline>, ordering: OrderingPolicy) -> Self {
        Self {
            pipeline,
            ordering,
            session: Arc::new(Mutex::new(SearchSession::new(ordering))),
            tool_router: Self::tool_router(),
        }
    }

    /// Same catalog, fresh filters.
    pub fn for_new_session(&self) -> Self {
        Self::new(Arc::clone(&self.pipeline), self.ordering)
    }
}

#[tool_router]
impl BloodFinderServer {
    #[tool(description = "Interpret a typed or transcribed request such as 'need O positive blood in Pune'. Detected blood group and location are merged into the current filters, then hospitals are searched. Returns matches and a sentence for audio playback.")]
    async fn interpret_query(
        &self,
        Parameters(params): Parameters<InterpretQueryParams>,
    ) -> Result<Json<InterpretQueryResponse>, String> {
        let mut session = self.session.lock().await;
        let ticket = session.begin_transcript();
        let outcome = self
            .pipeline
            .interpret(&mut session, ticket, &params.transcript);

        let total_matches = outcome.search.report.count();
        Ok(Json(InterpretQueryResponse {
            delta: DeltaInfo {
                blood_group: outcome.delta.blood_group.map(|g| g.code().to_string()),
                location: outcome.delta.location.clone(),
            },
            applied: outcome.applied,
            criteria: to_api_criteria(&outcome.search.criteria),
            total_matches,
            hospitals: summarize(&outcome.search.report.hospitals, params.limit),
            urgency_ignored: outcome.search.report.urgency_ignored,
            utterance: outcome.search.utterance,
        }))
    }

    #[tool(description = "Set search filters directly. blood_group accepts codes like 'AB-' or spoken forms like 'ab negative'; urgency accepts Low, Medium, High or Critical. Use the clear_* flags to remove a filter.")]
    async fn set_filters(
        &self,
        Parameters(params): Parameters<SetFiltersParams>,
    ) -> Result<Json<FiltersResponse>, String> {
        if params.clear_location && params.location.is_some() {
            return Err("location and clear_location are mutually exclusive".to_string());
        }
        if params.clear_blood_group && params.blood_group.is_some() {
            return Err("blood_group and clear_blood_group are mutually exclusive".to_string());
        }
        if params.clear_urgency && params.urgency.is_some() {
            return Err("urgency and clear_urgency are mutually exclusive".to_string());
        }

        // Validate everything before touching the session.
        let blood_group = params
            .blood_group
            .as_deref()
            .map(str::parse::<BloodGroup>)
            .transpose()
            .map_err(|e| e.to_string())?;
        let urgency = params
            .urgency
            .as_deref()
            .map(str::parse::<UrgencyLevel>)
            .transpose()
            .map_err(|e| e.to_string())?;

        let mut session = self.session.lock().await;
        if params.clear_location || params.location.is_some() {
            session.set_location(params.location);
        }
        if params.clear_blood_group || blood_group.is_some() {
            session.set_blood_group(blood_group);
        }
        if params.clear_urgency || urgency.is_some() {
            session.set_urgency(urgency);
        }
        info!(criteria = ?session.criteria(), "filters updated");

        Ok(Json(FiltersResponse {
            criteria: to_api_criteria(session.criteria()),
        }))
    }

    #[tool(description = "Remove every search filter.")]
    async fn clear_filters(&self) -> Result<Json<FiltersResponse>, String> {
        let mut session = self.session.lock().await;
        session.clear();
        Ok(Json(FiltersResponse {
            criteria: to_api_criteria(session.criteria()),
        }))
    }

    #[tool(description = "Search hospitals with the current filters. Results keep catalog order. Returns matches and a sentence for audio playback.")]
    async fn search_hospitals(
        &self,
        Parameters(params): Parameters<SearchHospitalsParams>,
    ) -> Result<Json<SearchHospitalsResponse>, String> {
        let session = self.session.lock().await;
        let outcome = self.pipeline.search(&session);
        Ok(Json(SearchHospitalsResponse {
            criteria: to_api_criteria(&outcome.criteria),
            total_matches: outcome.report.count(),
            hospitals: summarize(&outcome.report.hospitals, params.limit),
            urgency_ignored: outcome.report.urgency_ignored,
            utterance: outcome.utterance,
        }))
    }

    #[tool(description = "Describe one hospital by catalog id: its stock per blood group and a sentence listing the well-stocked groups.")]
    async fn describe_hospital(
        &self,
        Parameters(params): Parameters<DescribeHospitalParams>,
    ) -> Result<Json<HospitalDetailResponse>, String> {
        let (record, utterance) = self
            .pipeline
            .describe(params.hospital_id)
            .map_err(|e| e.to_string())?;
        Ok(Json(HospitalDetailResponse {
            hospital: to_api_hospital(record),
            utterance,
        }))
    }

    #[tool(description = "Short spoken count of hospitals matching the current filters.")]
    async fn read_results(&self) -> Result<Json<UtteranceResponse>, String> {
        let session = self.session.lock().await;
        let outcome = self.pipeline.search(&session);
        Ok(Json(UtteranceResponse {
            utterance: feedback::read_results(outcome.report.count()),
        }))
    }
}

fn summarize(hospitals: &[&HospitalRecord], limit: Option<u32>) -> Vec<HospitalSummary> {
    let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
    hospitals
        .iter()
        .take(limit)
        .map(|record| to_api_hospital(record))
        .collect()
}

fn to_api_hospital(record: &HospitalRecord) -> HospitalSummary {
    HospitalSummary {
        id: record.id,
        name: record.name.clone(),
        location: record.location.clone(),
        blood_stock: record
            .blood_stock
            .iter()
            .map(|(group, units)| StockEntry {
                blood_group: group.code().to_string(),
                units,
                level: StockLevel::classify(units).as_str().to_string(),
            })
            .collect(),
    }
}

fn to_api_criteria(criteria: &SearchCriteria) -> CriteriaInfo {
    CriteriaInfo {
        location: criteria.location.clone(),
        blood_group: criteria.blood_group.map(|g| g.code().to_string()),
        urgency: criteria.urgency.map(|u| u.as_str().to_string()),
    }
}

#[tool_handler]
impl ServerHandler for BloodFinderServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "blood-finder".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Blood availability directory MCP server. Use interpret_query for natural \
                 language requests (\"need B negative in Chennai\"), set_filters and \
                 clear_filters to edit filters directly, search_hospitals to list matches, \
                 describe_hospital for one hospital's stock, and read_results for a short \
                 spoken count. Urgency filters are accepted but not applied; the catalog \
                 has no urgency data."
                    .to_string(),
            ),
        }
    }
}
