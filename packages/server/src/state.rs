use std::sync::Arc;

use catalog::Catalog;
use dispatch::DispatchCore;
use execution::ExecutionCore;

/// The process-wide handle to the live dispatch and execution cores
/// (REDESIGN FLAG: replaces the source's per-request dynamic attribute
/// lookup with a registry established once at startup and injected into
/// every request handler).
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub dispatch: Arc<DispatchCore>,
    pub execution: Arc<ExecutionCore>,
}
