//! Metadata account state.

use {
    crate::error::MapToProgramIoError,
    serde::{Deserialize, Serialize},
    solana_program::{clock::Slot, program_error::ProgramError, pubkey::Pubkey},
};

/// Seed prefix of the metadata account address.
pub const USER_LOOKUP_TABLE_SEED: &[u8] = b"UserAddressLookupTable";

/// Minimum number of slots between two successful extends of the same table.
pub const COOLDOWN_SLOTS: u64 = 15;

/// Capacity of a native lookup table.
pub const MAX_ADDRESSES: usize = 256;

/// The serialized size of the metadata account: a 4-byte state tag followed
/// by the fixed-width fields of [`UserLookupTable`].
pub const USER_LOOKUP_TABLE_SIZE: usize = 4 + 32 + 32 + 8 + 8 + 8;

/// Program account states
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, AbiExample, AbiEnumVisitor)]
pub enum ProgramState {
    /// Account is not initialized.
    Uninitialized,
    /// Initialized lookup table wrapper whose native table can still grow.
    Active(UserLookupTable),
    /// The native table has been deactivated and can no longer grow.
    Deactivated(UserLookupTable),
}

impl ProgramState {
    /// The wrapped table, regardless of whether it is active.
    pub fn table(&self) -> Option<&UserLookupTable> {
        match self {
            Self::Uninitialized => None,
            Self::Active(table) | Self::Deactivated(table) => Some(table),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, ProgramError> {
        bincode::deserialize(data).map_to_program_io_error()
    }

    pub fn serialize_into(&self, data: &mut [u8]) -> Result<(), ProgramError> {
        if data.len() < USER_LOOKUP_TABLE_SIZE {
            return Err(ProgramError::AccountDataTooSmall);
        }
        bincode::serialize_into(&mut data[..USER_LOOKUP_TABLE_SIZE], self)
            .map_to_program_io_error()
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ProgramError> {
        let mut data = vec![0; USER_LOOKUP_TABLE_SIZE];
        self.serialize_into(&mut data)?;
        Ok(data)
    }
}

/// Metadata describing one user-owned lookup table.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq, Clone, AbiExample)]
pub struct UserLookupTable {
    /// Authority allowed to extend, deactivate and close the table
    pub owner: Pubkey,
    /// The native lookup table whose authority is this metadata account
    pub native_table: Pubkey,
    /// Owner-chosen id, only used to derive the metadata address
    pub id: u64,
    /// Number of addresses appended through this wrapper
    pub address_count: u64,
    /// Slot of creation or of the most recent extend
    pub last_updated_slot: Slot,
}

impl UserLookupTable {
    pub fn new(owner: Pubkey, native_table: Pubkey, id: u64, current_slot: Slot) -> Self {
        Self {
            owner,
            native_table,
            id,
            address_count: 0,
            last_updated_slot: current_slot,
        }
    }

    /// Whether the extend cooldown has elapsed at `current_slot`.
    pub fn is_ready(&self, current_slot: Slot) -> bool {
        current_slot.saturating_sub(self.last_updated_slot) >= COOLDOWN_SLOTS
    }

    pub fn slots_until_ready(&self, current_slot: Slot) -> u64 {
        self.last_updated_slot
            .saturating_add(COOLDOWN_SLOTS)
            .saturating_sub(current_slot)
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_ADDRESSES.saturating_sub(self.address_count as usize)
    }
}
