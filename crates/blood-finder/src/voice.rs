/// Transcript delivery and spoken output.
///
/// Speech recognition and synthesis live outside this crate. A recognizer
/// gets a `TranscriptSender` for each listen and either delivers one
/// transcript or cancels; the search side awaits the matching
/// `TranscriptReceiver`. Spoken output goes to an `UtteranceSink`.
use std::sync::Mutex;

use tokio::sync::mpsc;
use tracing::info;

use crate::criteria::{SearchSession, TranscriptTicket};
use crate::feedback::VOICE_PROMPT;
use crate::pipeline::{Pipeline, PipelineOutcome};

#[derive(Debug, Clone)]
pub struct TranscriptEvent {
    pub ticket: TranscriptTicket,
    pub text: String,
}

pub struct TranscriptSender {
    ticket: TranscriptTicket,
    tx: mpsc::Sender<TranscriptEvent>,
}

impl TranscriptSender {
    /// Hand over the recognized utterance. Returns `false` when nobody is
    /// listening any more.
    pub fn deliver(self, text: impl Into<String>) -> bool {
        let event = TranscriptEvent {
            ticket: self.ticket,
            text: text.into(),
        };
        self.tx.try_send(event).is_ok()
    }

    /// Stop listening; the receiver sees the channel close with no event.
    pub fn cancel(self) {
        info!(ticket = self.ticket.id(), "voice input cancelled");
    }
}

pub struct TranscriptReceiver {
    rx: mpsc::Receiver<TranscriptEvent>,
}

impl TranscriptReceiver {
    /// `None` once the sender cancelled or was dropped.
    pub async fn recv(&mut self) -> Option<TranscriptEvent> {
        self.rx.recv().await
    }
}

/// One utterance per listen, so the channel holds a single event.
pub fn transcript_channel(ticket: TranscriptTicket) -> (TranscriptSender, TranscriptReceiver) {
    let (tx, rx) = mpsc::channel(1);
    (TranscriptSender { ticket, tx }, TranscriptReceiver { rx })
}

/// Text-to-speech output. Fire and forget.
pub trait UtteranceSink: Send + Sync {
    fn speak(&self, text: &str);
}

/// Logs utterances instead of speaking them.
#[derive(Debug, Default)]
pub struct TracingSink;

impl UtteranceSink for TracingSink {
    fn speak(&self, text: &str) {
        info!(utterance = text, "speak");
    }
}

/// Keeps every utterance in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn utterances(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<String> {
        self.utterances().pop()
    }
}

impl UtteranceSink for RecordingSink {
    fn speak(&self, text: &str) {
        self.spoken
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(text.to_string());
    }
}

/// Prompt the user and open a channel for their answer.
pub fn start_listening(
    session: &mut SearchSession,
    sink: &dyn UtteranceSink,
) -> (TranscriptSender, TranscriptReceiver) {
    let ticket = session.begin_transcript();
    sink.speak(VOICE_PROMPT);
    info!(ticket = ticket.id(), "listening for transcript");
    transcript_channel(ticket)
}

/// Wait for the transcript and run it through the pipeline.
///
/// Cancellation returns `None` without extracting anything or touching the
/// session.
pub async fn await_transcript<'p>(
    session: &mut SearchSession,
    pipeline: &'p Pipeline,
    mut receiver: TranscriptReceiver,
    sink: &dyn UtteranceSink,
) -> Option<PipelineOutcome<'p>> {
    let event = receiver.recv().await?;
    let outcome = pipeline.interpret(session, event.ticket, &event.text);
    sink.speak(&outcome.search.utterance);
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::BloodGroup;

    #[tokio::test]
    async fn delivered_transcript_updates_session_and_speaks() {
        let pipeline = Pipeline::for_catalog(Catalog::sample().unwrap());
        let mut session = SearchSession::default();
        let sink = RecordingSink::new();

        let (sender, receiver) = start_listening(&mut session, &sink);
        tokio::spawn(async move {
            assert!(sender.deliver("b negative in chennai"));
        });

        let outcome = await_transcript(&mut session, &pipeline, receiver, &sink)
            .await
            .expect("transcript delivered");
        assert_eq!(session.criteria().blood_group, Some(BloodGroup::BNegative));
        assert_eq!(session.criteria().location.as_deref(), Some("chennai"));
        assert_eq!(outcome.search.report.count(), 1);
        assert_eq!(
            sink.utterances(),
            vec![
                VOICE_PROMPT.to_string(),
                "Found 1 hospitals with available B- in chennai".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn cancel_leaves_session_untouched() {
        let pipeline = Pipeline::for_catalog(Catalog::sample().unwrap());
        let mut session = SearchSession::default();
        session.set_location(Some("Pune".into()));
        let before = session.criteria().clone();
        let sink = RecordingSink::new();

        let (sender, receiver) = start_listening(&mut session, &sink);
        sender.cancel();

        assert!(await_transcript(&mut session, &pipeline, receiver, &sink)
            .await
            .is_none());
        assert_eq!(session.criteria(), &before);
        assert_eq!(sink.utterances(), vec![VOICE_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn deliver_after_receiver_dropped_reports_failure() {
        let mut session = SearchSession::default();
        let (sender, receiver) = transcript_channel(session.begin_transcript());
        drop(receiver);
        assert!(!sender.deliver("o+"));
    }
}
