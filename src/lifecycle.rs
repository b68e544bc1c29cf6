//! Transition rules of a user lookup table.
//!
//! A table moves `Uninitialized -> Active -> Deactivated` and is finally
//! closed. Every transition is validated here against an [`AccountStore`]
//! and a [`SlotClock`] without touching any account; the result is a plan
//! that the caller applies atomically, either through cross-program
//! invocations on-chain or directly in the in-memory ledger.

use {
    crate::{
        error::UserLookupTableError,
        events::LutEvent,
        native::NativeTable,
        pda::{find_native_table_address, find_user_lookup_table_address},
        state::{ProgramState, UserLookupTable, MAX_ADDRESSES},
        store::{AccountStore, SlotClock},
    },
    solana_program::{
        address_lookup_table, clock::Slot, msg, program_error::ProgramError, pubkey::Pubkey,
    },
    std::collections::HashSet,
};

/// Returns the candidates that are neither in `existing` nor repeated
/// earlier in `candidates`, in candidate order.
pub fn filter_new_addresses(existing: &[Pubkey], candidates: &[Pubkey]) -> Vec<Pubkey> {
    let mut seen: HashSet<&Pubkey> = existing.iter().collect();
    candidates
        .iter()
        .filter(|address| seen.insert(*address))
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlan {
    pub metadata_address: Pubkey,
    pub metadata_bump: u8,
    pub native_table_address: Pubkey,
    pub recent_slot: Slot,
    pub table: UserLookupTable,
}

impl CreatePlan {
    pub fn state(&self) -> ProgramState {
        ProgramState::Active(self.table.clone())
    }

    pub fn event(&self) -> LutEvent {
        LutEvent::Created {
            wrapper: self.metadata_address,
            lut_address: self.native_table_address,
            authority: self.table.owner,
            slot: self.table.last_updated_slot,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendPlan {
    pub metadata_address: Pubkey,
    pub metadata_bump: u8,
    /// The table after the extend is applied
    pub table: UserLookupTable,
    /// Addresses to append to the native table, already deduplicated
    pub new_addresses: Vec<Pubkey>,
    /// Size of the native table once the new addresses are appended
    pub total_addresses: usize,
}

impl ExtendPlan {
    pub fn state(&self) -> ProgramState {
        ProgramState::Active(self.table.clone())
    }

    pub fn event(&self) -> LutEvent {
        LutEvent::Extended {
            wrapper: self.metadata_address,
            addresses_added: self.new_addresses.len() as u32,
            total_addresses: self.total_addresses as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeactivatePlan {
    pub metadata_address: Pubkey,
    pub metadata_bump: u8,
    pub native_table_address: Pubkey,
    pub table: UserLookupTable,
}

impl DeactivatePlan {
    pub fn state(&self) -> ProgramState {
        ProgramState::Deactivated(self.table.clone())
    }

    pub fn event(&self) -> LutEvent {
        LutEvent::Deactivated {
            wrapper: self.metadata_address,
            lut_address: self.native_table_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosePlan {
    pub metadata_address: Pubkey,
    pub metadata_bump: u8,
    pub native_table_address: Pubkey,
    pub table: UserLookupTable,
}

impl ClosePlan {
    pub fn event(&self) -> LutEvent {
        LutEvent::Closed {
            wrapper: self.metadata_address,
            lut_address: self.native_table_address,
        }
    }
}

/// A metadata account that passed the ownership checks shared by every
/// transition after creation.
struct OwnedTable {
    state: ProgramState,
    table: UserLookupTable,
    bump: u8,
}

pub struct LookupTableLifecycle<'a, S: ?Sized, C: ?Sized> {
    program_id: &'a Pubkey,
    store: &'a S,
    clock: &'a C,
}

impl<'a, S, C> LookupTableLifecycle<'a, S, C>
where
    S: AccountStore + ?Sized,
    C: SlotClock + ?Sized,
{
    pub fn new(program_id: &'a Pubkey, store: &'a S, clock: &'a C) -> Self {
        Self {
            program_id,
            store,
            clock,
        }
    }

    pub fn create(
        &self,
        owner: &Pubkey,
        owner_signed: bool,
        metadata_address: &Pubkey,
        native_table_address: &Pubkey,
        recent_slot: Slot,
        id: u64,
    ) -> Result<CreatePlan, ProgramError> {
        if !owner_signed {
            msg!("Owner account must be a signer");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let (expected_metadata_address, metadata_bump) =
            find_user_lookup_table_address(owner, id, self.program_id)?;
        if *metadata_address != expected_metadata_address {
            msg!(
                "Metadata address must match derived address: {}",
                expected_metadata_address
            );
            return Err(ProgramError::InvalidSeeds);
        }
        if let Some(account) = self.store.fetch(metadata_address) {
            if account.owner == *self.program_id || !account.data.is_empty() {
                msg!("Metadata account {} is already initialized", metadata_address);
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        }

        let current_slot = self.clock.current_slot();
        if recent_slot >= current_slot {
            msg!("{} is not a recent slot", recent_slot);
            return Err(ProgramError::InvalidInstructionData);
        }

        let (expected_native_table_address, _) =
            find_native_table_address(metadata_address, recent_slot)?;
        if *native_table_address != expected_native_table_address {
            msg!(
                "Lookup table address must match derived address: {}",
                expected_native_table_address
            );
            return Err(UserLookupTableError::InvalidLookupTable.into());
        }
        if let Some(account) = self.store.fetch(native_table_address) {
            if !account.data.is_empty() {
                msg!("Lookup table account must not be allocated");
                return Err(ProgramError::AccountAlreadyInitialized);
            }
        }

        Ok(CreatePlan {
            metadata_address: *metadata_address,
            metadata_bump,
            native_table_address: *native_table_address,
            recent_slot,
            table: UserLookupTable::new(*owner, *native_table_address, id, current_slot),
        })
    }

    pub fn extend(
        &self,
        owner: &Pubkey,
        owner_signed: bool,
        metadata_address: &Pubkey,
        native_table_address: &Pubkey,
        candidates: &[Pubkey],
    ) -> Result<ExtendPlan, ProgramError> {
        let OwnedTable {
            state,
            mut table,
            bump,
        } = self.load_owned_table(owner, owner_signed, metadata_address, native_table_address)?;
        if !state.is_active() {
            msg!("Deactivated lookup tables cannot be extended");
            return Err(UserLookupTableError::TableDeactivated.into());
        }

        let current_slot = self.clock.current_slot();
        if !table.is_ready(current_slot) {
            msg!(
                "Lookup table is cooling down for {} more slots",
                table.slots_until_ready(current_slot)
            );
            return Err(UserLookupTableError::LutNotReady.into());
        }

        let native_table = self.load_native_table(native_table_address)?;
        let new_addresses = filter_new_addresses(&native_table.addresses, candidates);
        if new_addresses.is_empty() {
            msg!("All {} candidate addresses are already stored", candidates.len());
            return Err(UserLookupTableError::NoNewAddresses.into());
        }

        let total_addresses = native_table
            .addresses
            .len()
            .saturating_add(new_addresses.len());
        if total_addresses > MAX_ADDRESSES {
            msg!(
                "Extended lookup table length {} would exceed max capacity of {}",
                total_addresses,
                MAX_ADDRESSES
            );
            return Err(UserLookupTableError::MaxAddressesExceeded.into());
        }

        table.address_count = table
            .address_count
            .saturating_add(new_addresses.len() as u64);
        table.last_updated_slot = current_slot;

        Ok(ExtendPlan {
            metadata_address: *metadata_address,
            metadata_bump: bump,
            table,
            new_addresses,
            total_addresses,
        })
    }

    pub fn deactivate(
        &self,
        owner: &Pubkey,
        owner_signed: bool,
        metadata_address: &Pubkey,
        native_table_address: &Pubkey,
    ) -> Result<DeactivatePlan, ProgramError> {
        let OwnedTable { state, table, bump } =
            self.load_owned_table(owner, owner_signed, metadata_address, native_table_address)?;
        if !state.is_active() {
            msg!("Lookup table is already deactivated");
            return Err(UserLookupTableError::TableDeactivated.into());
        }

        Ok(DeactivatePlan {
            metadata_address: *metadata_address,
            metadata_bump: bump,
            native_table_address: *native_table_address,
            table,
        })
    }

    pub fn close(
        &self,
        owner: &Pubkey,
        owner_signed: bool,
        metadata_address: &Pubkey,
        native_table_address: &Pubkey,
    ) -> Result<ClosePlan, ProgramError> {
        let OwnedTable { state, table, bump } =
            self.load_owned_table(owner, owner_signed, metadata_address, native_table_address)?;
        if state.is_active() {
            msg!("Lookup table must be deactivated before closing");
            return Err(UserLookupTableError::TableNotDeactivated.into());
        }

        Ok(ClosePlan {
            metadata_address: *metadata_address,
            metadata_bump: bump,
            native_table_address: *native_table_address,
            table,
        })
    }

    fn load_owned_table(
        &self,
        owner: &Pubkey,
        owner_signed: bool,
        metadata_address: &Pubkey,
        native_table_address: &Pubkey,
    ) -> Result<OwnedTable, ProgramError> {
        if !owner_signed {
            msg!("Owner account must be a signer");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let account = self
            .store
            .fetch(metadata_address)
            .ok_or(ProgramError::UninitializedAccount)?;
        if account.owner != *self.program_id {
            return Err(ProgramError::InvalidAccountOwner);
        }

        let state = ProgramState::deserialize(&account.data)?;
        let table = state
            .table()
            .cloned()
            .ok_or(ProgramError::UninitializedAccount)?;

        if table.owner != *owner {
            msg!("Incorrect lookup table owner");
            return Err(ProgramError::IncorrectAuthority);
        }
        if table.native_table != *native_table_address {
            msg!(
                "Lookup table {} is not bound to this metadata account",
                native_table_address
            );
            return Err(UserLookupTableError::InvalidLookupTable.into());
        }

        let (expected_metadata_address, bump) =
            find_user_lookup_table_address(owner, table.id, self.program_id)?;
        if *metadata_address != expected_metadata_address {
            return Err(ProgramError::InvalidSeeds);
        }

        Ok(OwnedTable { state, table, bump })
    }

    fn load_native_table(
        &self,
        native_table_address: &Pubkey,
    ) -> Result<NativeTable, ProgramError> {
        let account = self
            .store
            .fetch(native_table_address)
            .ok_or(UserLookupTableError::InvalidLookupTable)?;
        if account.owner != address_lookup_table::program::id() {
            return Err(UserLookupTableError::InvalidLookupTable.into());
        }
        NativeTable::deserialize(&account.data)
            .map_err(|_| UserLookupTableError::InvalidLookupTable.into())
    }
}
