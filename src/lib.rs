//! User Address Lookup Table Program
//!
//! Wraps native address lookup tables with a per-owner metadata account that
//! tracks ownership, growth and the slot of the last update. Each owner may
//! hold any number of tables, keyed by a `u64` id.
#![cfg_attr(RUSTC_WITH_SPECIALIZATION, feature(min_specialization))]

#[macro_use]
extern crate solana_frozen_abi_macro;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;
pub mod error;
pub mod events;
pub mod instruction;
#[cfg(not(target_os = "solana"))]
pub mod ledger;
pub mod lifecycle;
pub mod native;
pub mod pda;
pub mod processor;
pub mod state;
pub mod store;

solana_program::declare_id!("846qK5Drj9NEn2P4AvXCKxoVnyYQYGzMu2W7gyvoYjHT");

/// A user lookup table as seen by clients: the metadata account address,
/// the native table it wraps and the addresses currently stored in it.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct UserLookupTableAccount {
    pub key: solana_program::pubkey::Pubkey,
    pub native_table: solana_program::pubkey::Pubkey,
    pub addresses: Vec<solana_program::pubkey::Pubkey>,
}
