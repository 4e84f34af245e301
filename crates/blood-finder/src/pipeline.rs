/// One pass from transcript to spoken summary.
///
/// The pipeline itself is stateless and shared; the `SearchSession` passed in
/// is the only thing it mutates.
use tracing::info;

use crate::catalog::Catalog;
use crate::criteria::{DeltaOutcome, SearchSession, TranscriptTicket};
use crate::error::AppError;
use crate::feedback;
use crate::model::{CriteriaDelta, HospitalRecord, SearchCriteria};
use crate::parser::CriteriaExtractor;
use crate::search::{MatchReport, SearchEngine};

#[derive(Debug)]
pub struct SearchOutcome<'a> {
    pub criteria: SearchCriteria,
    pub report: MatchReport<'a>,
    pub utterance: String,
}

#[derive(Debug)]
pub struct PipelineOutcome<'a> {
    pub delta: CriteriaDelta,
    pub applied: bool,
    pub search: SearchOutcome<'a>,
}

#[derive(Clone)]
pub struct Pipeline {
    extractor: CriteriaExtractor,
    engine: SearchEngine,
    notable_stock: u32,
}

impl Pipeline {
    pub fn new(extractor: CriteriaExtractor, engine: SearchEngine, notable_stock: u32) -> Self {
        Self {
            extractor,
            engine,
            notable_stock,
        }
    }

    /// Extractor that knows the catalog's place names, and the standard
    /// notable-stock threshold.
    pub fn for_catalog(catalog: Catalog) -> Self {
        let extractor = CriteriaExtractor::new().with_gazetteer(catalog.locations());
        Self::new(
            extractor,
            SearchEngine::new(catalog),
            feedback::NOTABLE_STOCK_UNITS,
        )
    }

    pub fn catalog(&self) -> &Catalog {
        self.engine.catalog()
    }

    /// Extract, merge, match, summarize.
    pub fn interpret(
        &self,
        session: &mut SearchSession,
        ticket: TranscriptTicket,
        transcript: &str,
    ) -> PipelineOutcome<'_> {
        let delta = self.extractor.extract(transcript);
        let applied = session.apply_delta(ticket, &delta) == DeltaOutcome::Applied;
        info!(
            ticket = ticket.id(),
            detected = !delta.is_empty(),
            applied,
            "transcript interpreted"
        );
        PipelineOutcome {
            delta,
            applied,
            search: self.search(session),
        }
    }

    /// Match the session's current criteria without touching them.
    pub fn search(&self, session: &SearchSession) -> SearchOutcome<'_> {
        let criteria = session.criteria().clone();
        let report = self.engine.search(&criteria);
        let utterance = feedback::summarize_results(report.count(), &criteria);
        SearchOutcome {
            criteria,
            report,
            utterance,
        }
    }

    pub fn describe(&self, hospital_id: u32) -> Result<(&HospitalRecord, String), AppError> {
        let record = self
            .catalog()
            .get(hospital_id)
            .ok_or(AppError::HospitalNotFound(hospital_id))?;
        Ok((record, feedback::describe_hospital(record, self.notable_stock)))
    }
}
