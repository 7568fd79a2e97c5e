use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use crate::prime::PrimeError;

/// Confidence used when testing prime candidates, in bits
pub const DEFAULT_CONFIDENCE: u32 = 5;

/// Knobs for key generation
#[derive(Debug, Clone)]
pub struct KeyGenConfig {
    confidence: u32,
    timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            timeout: None,
            cancel: None,
        }
    }
}

impl KeyGenConfig {
    /// A composite candidate survives the primality test with probability at
    /// most `2^-confidence`
    pub fn with_confidence(mut self, confidence: u32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Upper bound on the wall time of a single generation call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Flag that aborts generation as soon as it is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn confidence(&self) -> u32 {
        self.confidence
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Starts the clock for one generation call
    pub fn deadline(&self) -> Deadline {
        Deadline {
            until: self.timeout.map(|t| Instant::now() + t),
            cancel: self.cancel.clone(),
        }
    }
}

/// Point past which a search gives up
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    until: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    /// Deadline that never fires
    pub fn never() -> Self {
        Self::default()
    }

    pub fn check(&self) -> Result<(), PrimeError> {
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                log::warn!("generation cancelled");
                return Err(PrimeError::Cancelled);
            }
        }
        match self.until {
            Some(until) if Instant::now() >= until => {
                log::warn!("generation timed out");
                Err(PrimeError::TimedOut)
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = KeyGenConfig::default();
        assert_eq!(config.confidence(), 5);
        assert!(config.timeout().is_none());
        config.deadline().check().unwrap();
        Deadline::never().check().unwrap();
    }

    #[test]
    fn expired_deadline() {
        let deadline = KeyGenConfig::default()
            .with_timeout(Duration::ZERO)
            .deadline();
        assert!(matches!(deadline.check(), Err(PrimeError::TimedOut)));
    }

    #[test]
    fn cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let deadline = KeyGenConfig::default()
            .with_cancel_flag(flag.clone())
            .deadline();
        deadline.check().unwrap();
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(deadline.check(), Err(PrimeError::Cancelled)));
    }
}
