//! Lock-guarded ledger for hosts that serve several callers at once.

use std::sync::RwLock;

use tracing::info;

use crate::config::LedgerSpec;
use crate::error::BankerError;
use crate::ledger::Ledger;
use crate::types::{Grant, LedgerSnapshot, ProcessId, SafetyVerdict, Units};
use crate::validator::Validator;

/// A ledger behind one exclusive lock.
///
/// `request` holds the write lock across the whole check-then-act sequence
/// (tentative grant, safety check, commit or rollback), so no other request
/// or release can interleave with it. Reads take the shared lock and hand
/// out copies.
///
/// The value is owned by the host and passed by reference; there is no
/// process-wide instance.
pub struct SharedLedger {
    validator: Validator,
    ledger: RwLock<Option<Ledger>>,
}

impl SharedLedger {
    /// An empty, unconfigured ledger.
    pub fn new(validator: Validator) -> Self {
        Self {
            validator,
            ledger: RwLock::new(None),
        }
    }

    /// Wrap an already validated ledger.
    pub fn from_ledger(validator: Validator, ledger: Ledger) -> Self {
        Self {
            validator,
            ledger: RwLock::new(Some(ledger)),
        }
    }

    /// Replace the ledger wholesale with one built from `spec`.
    ///
    /// Validation runs before the lock is taken; on failure the previous
    /// ledger (if any) stays in place.
    pub fn configure(&self, spec: &LedgerSpec) -> Result<(), BankerError> {
        let fresh = self.validator.build(spec)?;
        let mut guard = self.ledger.write().map_err(|_| BankerError::LockPoisoned)?;
        let replaced = guard.replace(fresh).is_some();
        info!(replaced = replaced, "Shared ledger reconfigured");
        Ok(())
    }

    pub fn is_configured(&self) -> Result<bool, BankerError> {
        let guard = self.ledger.read().map_err(|_| BankerError::LockPoisoned)?;
        Ok(guard.is_some())
    }

    pub fn request(&self, process: ProcessId, units: &[Units]) -> Result<Grant, BankerError> {
        let mut guard = self.ledger.write().map_err(|_| BankerError::LockPoisoned)?;
        let ledger = guard.as_mut().ok_or(BankerError::NotConfigured)?;
        ledger.request(process, units)
    }

    pub fn release(&self, process: ProcessId, units: &[Units]) -> Result<(), BankerError> {
        let mut guard = self.ledger.write().map_err(|_| BankerError::LockPoisoned)?;
        let ledger = guard.as_mut().ok_or(BankerError::NotConfigured)?;
        ledger.release(process, units)
    }

    pub fn find_safe_sequence(&self) -> Result<SafetyVerdict, BankerError> {
        let guard = self.ledger.read().map_err(|_| BankerError::LockPoisoned)?;
        let ledger = guard.as_ref().ok_or(BankerError::NotConfigured)?;
        Ok(ledger.find_safe_sequence())
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, BankerError> {
        let guard = self.ledger.read().map_err(|_| BankerError::LockPoisoned)?;
        let ledger = guard.as_ref().ok_or(BankerError::NotConfigured)?;
        Ok(ledger.snapshot())
    }

    /// Copy of the whole ledger, for callers that want to evaluate offline.
    pub fn ledger(&self) -> Result<Ledger, BankerError> {
        let guard = self.ledger.read().map_err(|_| BankerError::LockPoisoned)?;
        guard.clone().ok_or(BankerError::NotConfigured)
    }
}

impl Default for SharedLedger {
    fn default() -> Self {
        Self::new(Validator::default())
    }
}
