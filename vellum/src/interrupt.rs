//! Cooperative interruption of long renders.
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A flag another thread raises to stop an evaluation.
///
/// The evaluation loop calls [`InterruptionFlag::check`] at its safe
/// points; the resulting [`Error::Interrupted`] reports
/// `bypasses_recovery`, so template level error recovery rethrows it
/// instead of swallowing it.
#[derive(Clone, Default)]
pub struct InterruptionFlag(Arc<AtomicBool>);

impl InterruptionFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag; every clone sees it.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Fails when the flag has been raised.
    pub fn check(&self) -> Result<()> {
        if self.is_interrupted() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn check_after_interrupt() {
        let flag = InterruptionFlag::new();
        flag.check().unwrap();

        let shared = flag.clone();
        shared.interrupt();
        let err = flag.check().unwrap_err();
        assert!(err.bypasses_recovery());
    }
}
