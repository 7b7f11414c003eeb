// src/optimization/settings.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Token de cancelación cooperativa: el núcleo lo consulta entre pivotes,
/// entre nodos y entre cortes. Combina una bandera manual con un límite
/// de reloj de pared opcional.
#[derive(Debug, Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    /// Token que se cancela solo al agotar `limit` de reloj de pared.
    pub fn with_deadline(limit: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + limit),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Relaxed) {
            return true;
        }
        match self.deadline {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuración de una corrida del solver. Los topes evitan que un
/// modelo degenerado deje al proceso iterando sin fin.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    /// Tope de iteraciones por corrida de simplex
    pub max_iterations: usize,
    /// Tope de nodos por búsqueda de ramificación y acotación
    pub max_nodes: usize,
    /// Tope de cortes por corrida de planos cortantes
    pub max_cuts: usize,
    /// Poda por cota en B&B; apagarla enumera todos los candidatos
    pub bound_pruning: bool,
    /// Detalle por iteración en el log
    pub verbose: bool,
    pub cancel: CancelToken,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 10_000,
            max_nodes: 10_000,
            max_cuts: 200,
            bound_pruning: true,
            verbose: false,
            cancel: CancelToken::new(),
        }
    }
}
