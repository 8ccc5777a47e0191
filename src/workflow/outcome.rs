use crate::components::google_calendar::CalendarEntry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Steps of one workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Authenticating,
    FetchingEmails,
    CreatingEvents,
    FetchingSchedule,
    Notifying,
    Done,
    /// Only reachable from `Authenticating`
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Authenticating => "authenticating",
            WorkflowState::FetchingEmails => "fetching_emails",
            WorkflowState::CreatingEvents => "creating_events",
            WorkflowState::FetchingSchedule => "fetching_schedule",
            WorkflowState::Notifying => "notifying",
            WorkflowState::Done => "done",
            WorkflowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What happened to a single email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Created(CalendarEntry),
    /// No date in the body
    Skipped,
    Failed(String),
}

/// Result of a completed workflow run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub emails_processed: usize,
    pub events_created: usize,
    pub events_skipped: usize,
    pub events_failed: usize,
    pub digest: String,
    pub notification_sent: bool,
    pub state: WorkflowState,
}

impl WorkflowSummary {
    pub(crate) fn tally(emails_processed: usize, outcomes: &[ItemOutcome]) -> Self {
        let mut summary = Self {
            emails_processed,
            events_created: 0,
            events_skipped: 0,
            events_failed: 0,
            digest: String::new(),
            notification_sent: false,
            state: WorkflowState::CreatingEvents,
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Created(_) => summary.events_created += 1,
                ItemOutcome::Skipped => summary.events_skipped += 1,
                ItemOutcome::Failed(_) => summary.events_failed += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_each_outcome() {
        let outcomes = vec![
            ItemOutcome::Created(CalendarEntry::default()),
            ItemOutcome::Skipped,
            ItemOutcome::Failed("boom".to_string()),
            ItemOutcome::Created(CalendarEntry::default()),
        ];
        let summary = WorkflowSummary::tally(4, &outcomes);

        assert_eq!(summary.emails_processed, 4);
        assert_eq!(summary.events_created, 2);
        assert_eq!(summary.events_skipped, 1);
        assert_eq!(summary.events_failed, 1);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(WorkflowState::FetchingSchedule.to_string(), "fetching_schedule");
        assert_eq!(
            serde_json::to_string(&WorkflowState::Done).unwrap(),
            "\"done\""
        );
    }
}
