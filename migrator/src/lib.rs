//! Migration of a custodial wallet from legacy to safe custody.
//!
//! [`Migrator`] drives four idempotent phases against a [`LedgerClient`]:
//! drain legacy balances, rotate the authorization key, activate safe custody
//! and drain every unspent safe output in batched, signed transactions.
//!
//! [`LedgerClient`]: safemig_wallet_core::LedgerClient

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod phase;
pub mod pipeline;
pub mod report;
pub mod utxos;

pub use context::{resolve_receiver, validate_receiver, MigrationContext};
pub use error::MigrationError;
pub use orchestrator::Migrator;
pub use phase::Phase;
pub use pipeline::{settle_group, SettledGroup, SIGNER_INDEX};
pub use report::{LegacyTransfer, MigrationReport, SafeAssetDrain};
pub use utxos::{list_unspent, UtxoPager, PAGE_SIZE};
