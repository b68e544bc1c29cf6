//! Owned view of a native address lookup table account.

use {
    crate::error::MapToProgramIoError,
    solana_program::{
        address_lookup_table::state::{
            LookupTableMeta, ProgramState as NativeProgramState, LOOKUP_TABLE_META_SIZE,
        },
        clock::Slot,
        program_error::ProgramError,
        pubkey::Pubkey,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeTable {
    pub meta: LookupTableMeta,
    pub addresses: Vec<Pubkey>,
}

impl NativeTable {
    pub fn new(authority: Pubkey) -> Self {
        Self {
            meta: LookupTableMeta::new(authority),
            addresses: Vec::new(),
        }
    }

    /// Parses the 56-byte meta header followed by the packed addresses.
    pub fn deserialize(data: &[u8]) -> Result<Self, ProgramError> {
        let state: NativeProgramState = bincode::deserialize(data).map_to_program_io_error()?;
        let meta = match state {
            NativeProgramState::LookupTable(meta) => meta,
            NativeProgramState::Uninitialized => return Err(ProgramError::UninitializedAccount),
        };

        let raw_addresses_data = data
            .get(LOOKUP_TABLE_META_SIZE..)
            .ok_or(ProgramError::InvalidAccountData)?;
        let addresses: &[Pubkey] = bytemuck::try_cast_slice(raw_addresses_data)
            .map_err(|_| ProgramError::InvalidAccountData)?;

        Ok(Self {
            meta,
            addresses: addresses.to_vec(),
        })
    }

    pub fn serialize(&self) -> Result<Vec<u8>, ProgramError> {
        let mut data = vec![0; Self::data_len(self.addresses.len())];
        bincode::serialize_into(
            &mut data[..LOOKUP_TABLE_META_SIZE],
            &NativeProgramState::LookupTable(self.meta.clone()),
        )
        .map_to_program_io_error()?;
        data[LOOKUP_TABLE_META_SIZE..].copy_from_slice(bytemuck::cast_slice(&self.addresses));
        Ok(data)
    }

    /// Account size of a table holding `num_addresses` entries.
    pub fn data_len(num_addresses: usize) -> usize {
        LOOKUP_TABLE_META_SIZE.saturating_add(num_addresses.saturating_mul(32))
    }

    pub fn is_deactivated(&self) -> bool {
        self.meta.deactivation_slot != Slot::MAX
    }
}
