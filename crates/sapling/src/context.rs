//! Runtime configuration

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::environment::DEFAULT_MAX_DEPTH;

/// Seed used when the embedder does not pick one.
pub const DEFAULT_RNG_SEED: u64 = 0x5EED_5A91_1C0F_FEE5;

/// Configuration and shared control state for a [`Runtime`](crate::Runtime).
///
/// Loadable from any serde format; missing fields take their defaults.
///
/// ```
/// use sapling::EvalContext;
///
/// let config = EvalContext::new().with_max_stack_depth(64).with_rng_seed(7);
/// assert_eq!(config.max_stack_depth, 64);
/// assert!(!config.is_interrupted());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalContext {
    /// Maximum number of stacked frames (0 = unlimited)
    pub max_stack_depth: usize,

    /// Seed of the runtime's random-number stream
    pub rng_seed: u64,

    /// Emit call-state transitions at `trace` level
    pub trace: bool,

    /// Interrupt flag; set to true to terminate at the next call
    #[serde(skip)]
    pub interrupt: Arc<AtomicBool>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self {
            max_stack_depth: DEFAULT_MAX_DEPTH,
            rng_seed: DEFAULT_RNG_SEED,
            trace: false,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl EvalContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame limit.
    pub fn with_max_stack_depth(mut self, max_depth: usize) -> Self {
        self.max_stack_depth = max_depth;
        self
    }

    /// Set the random seed.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    /// Enable or disable call tracing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Check if evaluation has been interrupted.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.load(Ordering::Relaxed)
    }

    /// Request interruption of evaluation.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::Relaxed);
    }

    /// Reset the interrupt flag.
    pub fn reset_interrupt(&self) {
        self.interrupt.store(false, Ordering::Relaxed);
    }
}
