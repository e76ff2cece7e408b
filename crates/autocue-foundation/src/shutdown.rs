use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session-wide cancellation signal shared by every pipeline thread.
///
/// Workers check it between blocking waits; queue waits use short timeouts so
/// a signalled token stops the pipeline promptly.
#[derive(Clone, Debug, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) {
        if !self.flag.swap(true, Ordering::SeqCst) {
            tracing::info!("Shutdown signalled");
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
