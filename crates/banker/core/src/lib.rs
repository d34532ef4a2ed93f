//! # banker-core
//!
//! Deadlock-avoiding resource ledger built around the Banker's Algorithm:
//!
//! - **Ledger** — per-resource totals and availability, plus one contiguous
//!   `(process, resource)` table of claim / allocation / need
//! - **Validator** — staged construction of a `Ledger` from operator input;
//!   nothing is visible until every value is inside its bound
//! - **Safety check** — classical work/finish scan producing a deterministic
//!   safe sequence or the set of processes that cannot finish
//! - **Request** — grant only when the resulting state stays safe, with exact
//!   rollback otherwise
//! - **Release** — return units to the pool; never needs a safety check
//!
//! ## Ledger Invariants
//!
//! After every public operation, granted or denied:
//!
//! 1. `available[r] + Σ_p allocated[p][r] = total[r]`
//! 2. `0 ≤ allocated[p][r] ≤ max_claim[p][r] ≤ total[r]`
//! 3. `need[p][r] = max_claim[p][r] − allocated[p][r]`
//!
//! Every addition and subtraction on ledger quantities is checked; a value
//! that would leave its range is reported as `ArithmeticOverflow` /
//! `ArithmeticUnderflow` before anything is written.
//!
//! ## Concurrency
//!
//! `Ledger` itself is a plain caller-owned value. `SharedLedger` wraps one in
//! a lock held across the whole check-then-act sequence of a request.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod ledger;
pub mod release;
pub mod request;
pub mod safety;
pub mod shared;
pub mod types;
pub mod validator;

pub use config::{BankerConfig, LedgerSpec, LimitsConfig};
pub use error::{BankerError, Bound, Quantity, ValidationError};
pub use ledger::{Ledger, ProcessView};
pub use release::release;
pub use request::request;
pub use safety::find_safe_sequence;
pub use shared::SharedLedger;
pub use types::{
    Grant, LedgerSnapshot, ProcessId, ResourceId, SafeSequence, SafetyVerdict, Units,
};
pub use validator::{configure, Validator};
