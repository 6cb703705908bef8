use crate::model::Outcome;

/// Accumulated per-list outcomes and free-text diagnostics for one
/// reconciliation run.
///
/// The collector never aborts anything itself: phases push into it and keep
/// going, and the caller decides at the end what the accumulated state means
/// for the process exit code.
#[derive(Debug, Default)]
pub struct RunReport {
    outcomes: Vec<(String, Outcome)>,
    diagnostics: Vec<String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, name: impl Into<String>, outcome: Outcome) {
        self.outcomes.push((name.into(), outcome));
    }

    pub fn push_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics.push(message.into());
    }

    pub fn extend_diagnostics(&mut self, messages: impl IntoIterator<Item = String>) {
        self.diagnostics.extend(messages);
    }

    /// Per-list outcomes in input order.
    pub fn outcomes(&self) -> &[(String, Outcome)] {
        &self.outcomes
    }

    pub fn outcome_for(&self, name: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(list, _)| list == name)
            .map(|(_, outcome)| *outcome)
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Number of lists that ended the run in a failed state. Validation
    /// diagnostics alone do not count as failures.
    pub fn failed_lists(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| {
                matches!(outcome, Outcome::DeleteFailed | Outcome::CreateFailed)
            })
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_lists() > 0
    }
}
