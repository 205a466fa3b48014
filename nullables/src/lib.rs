//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of a migration run (ledger API, identity
//! lookup, key generation, keystore file) sits behind a trait. This crate
//! provides test implementations that:
//! - Return deterministic values
//! - Record what was asked of them
//! - Can be made to fail on demand
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod identity;
pub mod keys;
pub mod keystore;
pub mod ledger;

pub use identity::NullIdentity;
pub use keys::NullKeySource;
pub use keystore::NullKeystoreStore;
pub use ledger::{LedgerCall, LedgerOp, NullLedger};
