// src/engine/stop.rs
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Cooperative stop flag, checked between requests.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag on SIGINT/SIGTERM. A second signal while the flag is already set
    /// terminates the process right away.
    pub fn install() -> Result<Self> {
        use signal_hook::consts::TERM_SIGNALS;
        use signal_hook::flag;

        let stop = Self::new();
        for sig in TERM_SIGNALS {
            flag::register_conditional_shutdown(*sig, 1, Arc::clone(&stop.0))
                .and_then(|_| flag::register(*sig, Arc::clone(&stop.0)))
                .map_err(|e| Error::Config(format!("cannot install signal handler: {e}")))?;
        }
        Ok(stop)
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
