use std::sync::Arc;

use crate::dashboard::Dashboard;
use crate::evaluation::classifier::Classifier;
use crate::evaluation::machine::EvaluationMachine;
use crate::store::EvaluationStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub machine: Arc<EvaluationMachine>,
    /// Read-only views; shares the store with the machine.
    pub dashboard: Dashboard,
}

impl AppState {
    /// Wires the state machine and the dashboard over one store.
    pub fn new(store: Arc<dyn EvaluationStore>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            machine: Arc::new(EvaluationMachine::new(store.clone(), classifier)),
            dashboard: Dashboard::new(store),
        }
    }
}
