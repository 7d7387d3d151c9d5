use std::collections::HashMap;
use std::sync::Mutex;

use super::sparql_client::{SparqlExecutor, SparqlRow, SparqlTerm};
use super::QueryError;

enum CannedResponse {
    Rows(Vec<SparqlRow>),
    Error(fn() -> QueryError),
}

/// In-memory executor answering by lookup label. Unknown labels return no rows.
pub(crate) struct FakeExecutor {
    responses: HashMap<String, CannedResponse>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FakeExecutor {
    pub(crate) fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_rows(mut self, label: &str, rows: Vec<SparqlRow>) -> Self {
        self.responses
            .insert(label.to_string(), CannedResponse::Rows(rows));
        self
    }

    /// Answers every query under `label` with a fresh error from `error`.
    pub(crate) fn with_error(mut self, label: &str, error: fn() -> QueryError) -> Self {
        self.responses
            .insert(label.to_string(), CannedResponse::Error(error));
        self
    }

    /// Labels of every executed query, in call order.
    pub(crate) fn call_labels(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("fake executor lock poisoned")
            .iter()
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub(crate) fn query_for(&self, label: &str) -> Option<String> {
        self.calls
            .lock()
            .expect("fake executor lock poisoned")
            .iter()
            .find(|(called, _)| called == label)
            .map(|(_, query)| query.clone())
    }
}

impl SparqlExecutor for FakeExecutor {
    fn select(&self, label: &str, query: &str) -> Result<Vec<SparqlRow>, QueryError> {
        self.calls
            .lock()
            .expect("fake executor lock poisoned")
            .push((label.to_string(), query.to_string()));
        match self.responses.get(label) {
            Some(CannedResponse::Rows(rows)) => Ok(rows.clone()),
            Some(CannedResponse::Error(factory)) => Err(factory()),
            None => Ok(Vec::new()),
        }
    }
}

/// Builds a row from `(variable, value)` pairs.
pub(crate) fn row(bindings: &[(&str, &str)]) -> SparqlRow {
    SparqlRow::new(
        bindings
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    SparqlTerm {
                        value: value.to_string(),
                    },
                )
            })
            .collect(),
    )
}
