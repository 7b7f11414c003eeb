// src/engine/cache.rs
//
// Caché de proceso con la última resolución exitosa. Las acciones de
// seguimiento (cambiar RHS, dualidad, sensibilidad) leen de aquí.
// El handle se reemplaza completo de forma atómica: los lectores toman
// una instantánea (Arc) y nunca ven mutaciones parciales.

use std::sync::{Arc, OnceLock, RwLock};

use optima_core::Model;
use optima_core::optimization::result::SolverResult;

#[derive(Debug, Clone)]
pub struct LastSolve {
    pub model_text: String,
    pub model: Model,
    pub result: SolverResult,
}

fn slot() -> &'static RwLock<Option<Arc<LastSolve>>> {
    static SLOT: OnceLock<RwLock<Option<Arc<LastSolve>>>> = OnceLock::new();
    SLOT.get_or_init(|| RwLock::new(None))
}

/// Reemplaza la entrada; el último escritor gana.
pub fn store(entry: LastSolve) {
    let mut guard = match slot().write() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = Some(Arc::new(entry));
}

/// Instantánea de la última resolución, si existe.
pub fn snapshot() -> Option<Arc<LastSolve>> {
    let guard = match slot().read() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    guard.clone()
}

/// Reinicio explícito (no hay expiración automática).
pub fn clear() {
    let mut guard = match slot().write() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = None;
}
