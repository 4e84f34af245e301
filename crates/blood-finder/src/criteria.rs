use std::str::FromStr;

use tracing::{debug, info};

use crate::error::AppError;
use crate::model::{BloodGroup, CriteriaDelta, SearchCriteria, UrgencyLevel};

/// How a transcript delta interacts with manual edits made while the
/// transcript was still being recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderingPolicy {
    /// Deltas merge on arrival; the latest write to a field wins.
    #[default]
    LastWriterWins,
    /// Deltas issued before the latest manual edit are dropped.
    DiscardStale,
}

impl FromStr for OrderingPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-writer-wins" | "lww" => Ok(Self::LastWriterWins),
            "discard-stale" => Ok(Self::DiscardStale),
            other => Err(AppError::Config(format!(
                "unknown ordering policy '{other}' (expected last-writer-wins or discard-stale)"
            ))),
        }
    }
}

/// Request id handed out when listening starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TranscriptTicket(u64);

impl TranscriptTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOutcome {
    Applied,
    Stale,
}

/// The criteria owned by one search session.
#[derive(Debug, Default)]
pub struct SearchSession {
    criteria: SearchCriteria,
    policy: OrderingPolicy,
    next_seq: u64,
    last_manual_seq: u64,
}

impl SearchSession {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn manual_edit(&mut self) {
        self.last_manual_seq = self.bump();
    }

    /// A blank location clears the filter.
    pub fn set_location(&mut self, location: Option<String>) {
        self.manual_edit();
        self.criteria.location = location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
    }

    pub fn set_blood_group(&mut self, blood_group: Option<BloodGroup>) {
        self.manual_edit();
        self.criteria.blood_group = blood_group;
    }

    pub fn set_urgency(&mut self, urgency: Option<UrgencyLevel>) {
        self.manual_edit();
        self.criteria.urgency = urgency;
    }

    pub fn clear(&mut self) {
        self.manual_edit();
        self.criteria = SearchCriteria::default();
        info!("search criteria cleared");
    }

    pub fn begin_transcript(&mut self) -> TranscriptTicket {
        TranscriptTicket(self.bump())
    }

    /// Merge a delta: detected fields overwrite, undetected ones are kept.
    pub fn apply_delta(&mut self, ticket: TranscriptTicket, delta: &CriteriaDelta) -> DeltaOutcome {
        if self.policy == OrderingPolicy::DiscardStale && ticket.0 < self.last_manual_seq {
            info!(
                ticket = ticket.0,
                last_edit = self.last_manual_seq,
                "discarding stale transcript delta"
            );
            return DeltaOutcome::Stale;
        }
        if let Some(group) = delta.blood_group {
            self.criteria.blood_group = Some(group);
        }
        if let Some(location) = &delta.location {
            self.criteria.location = Some(location.clone());
        }
        debug!(criteria = ?self.criteria, "transcript delta applied");
        DeltaOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(group: Option<BloodGroup>, location: Option<&str>) -> CriteriaDelta {
        CriteriaDelta {
            blood_group: group,
            location: location.map(str::to_string),
        }
    }

    #[test]
    fn delta_merges_without_erasing() {
        let mut session = SearchSession::default();
        session.set_urgency(Some(UrgencyLevel::High));
        session.set_location(Some("Delhi".into()));

        let ticket = session.begin_transcript();
        let outcome = session.apply_delta(ticket, &delta(Some(BloodGroup::ONegative), None));

        assert_eq!(outcome, DeltaOutcome::Applied);
        let c = session.criteria();
        assert_eq!(c.blood_group, Some(BloodGroup::ONegative));
        assert_eq!(c.location.as_deref(), Some("Delhi"));
        assert_eq!(c.urgency, Some(UrgencyLevel::High));
    }

    #[test]
    fn empty_delta_changes_nothing() {
        let mut session = SearchSession::default();
        session.set_blood_group(Some(BloodGroup::APositive));
        let before = session.criteria().clone();
        let ticket = session.begin_transcript();
        session.apply_delta(ticket, &CriteriaDelta::default());
        assert_eq!(session.criteria(), &before);
    }

    #[test]
    fn last_writer_wins_applies_late_transcript() {
        let mut session = SearchSession::new(OrderingPolicy::LastWriterWins);
        let ticket = session.begin_transcript();
        session.set_blood_group(Some(BloodGroup::BPositive));
        let outcome = session.apply_delta(ticket, &delta(Some(BloodGroup::AbPositive), None));
        assert_eq!(outcome, DeltaOutcome::Applied);
        assert_eq!(session.criteria().blood_group, Some(BloodGroup::AbPositive));
    }

    #[test]
    fn discard_stale_drops_transcript_older_than_manual_edit() {
        let mut session = SearchSession::new(OrderingPolicy::DiscardStale);
        let ticket = session.begin_transcript();
        session.set_blood_group(Some(BloodGroup::BPositive));
        let outcome = session.apply_delta(ticket, &delta(Some(BloodGroup::AbPositive), Some("pune")));
        assert_eq!(outcome, DeltaOutcome::Stale);
        assert_eq!(session.criteria().blood_group, Some(BloodGroup::BPositive));
        assert_eq!(session.criteria().location, None);

        let fresh = session.begin_transcript();
        assert_eq!(
            session.apply_delta(fresh, &delta(None, Some("pune"))),
            DeltaOutcome::Applied
        );
        assert_eq!(session.criteria().location.as_deref(), Some("pune"));
    }

    #[test]
    fn blank_location_clears_filter() {
        let mut session = SearchSession::default();
        session.set_location(Some("Mumbai".into()));
        session.set_location(Some("   ".into()));
        assert_eq!(session.criteria().location, None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut session = SearchSession::default();
        session.set_location(Some("Mumbai".into()));
        session.set_blood_group(Some(BloodGroup::ONegative));
        session.set_urgency(Some(UrgencyLevel::Critical));
        session.clear();
        assert!(session.criteria().is_empty());
    }

    #[test]
    fn ordering_policy_parses() {
        assert_eq!(
            "discard-stale".parse::<OrderingPolicy>().unwrap(),
            OrderingPolicy::DiscardStale
        );
        assert_eq!(
            "Last-Writer-Wins".parse::<OrderingPolicy>().unwrap(),
            OrderingPolicy::LastWriterWins
        );
        assert!("fifo".parse::<OrderingPolicy>().is_err());
    }
}
