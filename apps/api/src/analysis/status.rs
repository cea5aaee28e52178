//! Status events emitted while a submission is processed.
//!
//! The analyzer only produces an ordered stream of `StatusEvent`s. Toasts,
//! headlines and logs are independent subscribers implementing `StatusSink`.

use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    UploadingFile,
    Converting,
    UploadingImage,
    Analyzing,
    Complete,
    Failed,
}

impl WorkflowPhase {
    /// Headline wording shown while a submission is on screen.
    pub fn headline(self) -> &'static str {
        match self {
            WorkflowPhase::Idle => "Drop your resume for an ATS score and improvement tips",
            WorkflowPhase::Complete => "Analysis complete! Redirecting ....",
            WorkflowPhase::Failed => "Analysis failed. Please try again.",
            _ => "Analyzing your resume...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEvent {
    pub phase: WorkflowPhase,
    pub message: String,
}

impl StatusEvent {
    pub fn new(phase: WorkflowPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, WorkflowPhase::Complete | WorkflowPhase::Failed)
    }

    pub fn headline(&self) -> &'static str {
        self.phase.headline()
    }
}

/// A subscriber to the status stream. Called synchronously, in order.
pub trait StatusSink: Send + Sync {
    fn report(&self, event: StatusEvent);
}

/// Writes every event to the tracing log.
#[derive(Debug, Default)]
pub struct StatusLog;

impl StatusSink for StatusLog {
    fn report(&self, event: StatusEvent) {
        match event.phase {
            WorkflowPhase::Failed => {
                warn!(phase = ?event.phase, headline = event.headline(), "{}", event.message)
            }
            _ if event.is_terminal() => {
                info!(phase = ?event.phase, headline = event.headline(), "{}", event.message)
            }
            _ => info!(phase = ?event.phase, "{}", event.message),
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct StatusRecorder {
    events: Mutex<Vec<StatusEvent>>,
}

impl StatusRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn phases(&self) -> Vec<WorkflowPhase> {
        self.events().into_iter().map(|e| e.phase).collect()
    }

    pub fn last(&self) -> Option<StatusEvent> {
        self.events().pop()
    }

    /// Phase of the latest event; `Idle` before anything was reported.
    pub fn current_phase(&self) -> WorkflowPhase {
        self.last().map(|e| e.phase).unwrap_or(WorkflowPhase::Idle)
    }
}

impl StatusSink for StatusRecorder {
    fn report(&self, event: StatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Forwards events to a channel. A dropped receiver is not an error.
impl StatusSink for UnboundedSender<StatusEvent> {
    fn report(&self, event: StatusEvent) {
        let _ = self.send(event);
    }
}

/// Delivers each event to several sinks, in registration order.
#[derive(Default)]
pub struct Fanout<'a> {
    sinks: Vec<&'a dyn StatusSink>,
}

impl<'a> Fanout<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with(mut self, sink: &'a dyn StatusSink) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl StatusSink for Fanout<'_> {
    fn report(&self, event: StatusEvent) {
        for sink in &self.sinks {
            sink.report(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_keeps_order() {
        let recorder = StatusRecorder::new();
        recorder.report(StatusEvent::new(WorkflowPhase::UploadingFile, "a"));
        recorder.report(StatusEvent::new(WorkflowPhase::Converting, "b"));
        assert_eq!(
            recorder.phases(),
            vec![WorkflowPhase::UploadingFile, WorkflowPhase::Converting]
        );
        assert_eq!(recorder.last().unwrap().message, "b");
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let first = StatusRecorder::new();
        let second = StatusRecorder::new();
        let fanout = Fanout::new().with(&first).with(&second).with(&StatusLog);

        fanout.report(StatusEvent::new(WorkflowPhase::Analyzing, "Analyzing resume..."));

        assert_eq!(first.events().len(), 1);
        assert_eq!(second.events(), first.events());
    }

    #[tokio::test]
    async fn test_channel_sink_streams_events() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<StatusEvent>();
        tx.report(StatusEvent::new(WorkflowPhase::Complete, "done"));
        drop(tx);

        let event = rx.recv().await.unwrap();
        assert!(event.is_terminal());
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<StatusEvent>();
        drop(rx);
        tx.report(StatusEvent::new(WorkflowPhase::Failed, "gone"));
    }

    #[test]
    fn test_headlines() {
        let busy = StatusEvent::new(WorkflowPhase::Converting, "x");
        let done = StatusEvent::new(WorkflowPhase::Complete, "x");
        let failed = StatusEvent::new(WorkflowPhase::Failed, "x");
        assert_eq!(busy.headline(), "Analyzing your resume...");
        assert_eq!(done.headline(), "Analysis complete! Redirecting ....");
        assert!(failed.headline().contains("failed"));
        assert!(!busy.is_terminal());
    }

    #[test]
    fn test_log_accepts_every_phase() {
        for phase in [WorkflowPhase::Analyzing, WorkflowPhase::Complete, WorkflowPhase::Failed] {
            StatusLog.report(StatusEvent::new(phase, "x"));
        }
    }

    #[test]
    fn test_recorder_starts_idle() {
        let recorder = StatusRecorder::new();
        assert_eq!(recorder.current_phase(), WorkflowPhase::Idle);
        recorder.report(StatusEvent::new(WorkflowPhase::Failed, "x"));
        assert_eq!(recorder.current_phase(), WorkflowPhase::Failed);
    }
}
