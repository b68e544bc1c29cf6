//! A deterministic, single-threaded ledger for exercising the lookup table
//! lifecycle off-chain.
//!
//! The ledger executes program instructions the way the runtime would: the
//! lifecycle validates the instruction against the current accounts and
//! slot, then the resulting plan is applied to a staged copy of the account
//! set, together with a model of the native lookup table program's rules
//! and rent. The staged copy only replaces the committed accounts when the
//! whole instruction succeeds.

use {
    crate::{
        events::LutEvent,
        instruction::{UserLookupTableInstruction, FIXED_ACCOUNTS_LEN},
        lifecycle::{ClosePlan, CreatePlan, DeactivatePlan, ExtendPlan, LookupTableLifecycle},
        native::NativeTable,
        state::{ProgramState, USER_LOOKUP_TABLE_SIZE},
        store::{AccountStore, RawAccount, SlotClock},
        UserLookupTableAccount,
    },
    log::*,
    solana_program::{
        address_lookup_table, clock::Slot, instruction::Instruction, program_error::ProgramError,
        pubkey::Pubkey, rent::Rent, slot_hashes::MAX_ENTRIES, system_program,
    },
    std::collections::HashMap,
};

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Slot the ledger starts at
    pub initial_slot: Slot,
    pub rent: Rent,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_slot: 1,
            rent: Rent::default(),
        }
    }
}

pub struct InMemoryLedger {
    program_id: Pubkey,
    slot: Slot,
    rent: Rent,
    accounts: HashMap<Pubkey, RawAccount>,
    events: Vec<LutEvent>,
}

impl AccountStore for InMemoryLedger {
    fn fetch(&self, address: &Pubkey) -> Option<RawAccount> {
        self.accounts.fetch(address)
    }
}

impl SlotClock for InMemoryLedger {
    fn current_slot(&self) -> Slot {
        self.slot
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl InMemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            program_id: crate::id(),
            slot: config.initial_slot,
            rent: config.rent,
            accounts: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Moves the clock forward. Slots never move backwards.
    pub fn warp_to_slot(&mut self, slot: Slot) -> Result<(), ProgramError> {
        if slot < self.slot {
            warn!("refusing to warp from slot {} back to {}", self.slot, slot);
            return Err(ProgramError::InvalidArgument);
        }
        self.slot = slot;
        Ok(())
    }

    pub fn advance_slots(&mut self, slots: u64) {
        self.slot = self.slot.saturating_add(slots);
    }

    pub fn fund_account(&mut self, address: &Pubkey, lamports: u64) {
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| RawAccount::new(0, vec![], system_program::id()));
        account.lamports = account.lamports.saturating_add(lamports);
    }

    pub fn get_account(&self, address: &Pubkey) -> Option<&RawAccount> {
        self.accounts.get(address)
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.accounts
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or_default()
    }

    /// Decoded state of a metadata account.
    pub fn user_lookup_table(&self, metadata: &Pubkey) -> Option<ProgramState> {
        let account = self.accounts.get(metadata)?;
        ProgramState::deserialize(&account.data).ok()
    }

    pub fn native_table(&self, address: &Pubkey) -> Option<NativeTable> {
        let account = self.accounts.get(address)?;
        NativeTable::deserialize(&account.data).ok()
    }

    /// Client view of a table: its metadata address, native table and the
    /// stored addresses.
    pub fn lookup_table_account(&self, metadata: &Pubkey) -> Option<UserLookupTableAccount> {
        let state = self.user_lookup_table(metadata)?;
        let table = state.table()?;
        let native_table = self.native_table(&table.native_table)?;
        Some(UserLookupTableAccount {
            key: *metadata,
            native_table: table.native_table,
            addresses: native_table.addresses,
        })
    }

    /// Events of every successful instruction, oldest first.
    pub fn events(&self) -> &[LutEvent] {
        &self.events
    }

    /// Executes `instruction` atomically. `signers` are the keys whose
    /// signatures the enclosing transaction carries.
    pub fn process_instruction(
        &mut self,
        instruction: &Instruction,
        signers: &[Pubkey],
    ) -> Result<(), ProgramError> {
        let result = self.execute(instruction, signers);
        match &result {
            Ok(event) => {
                info!("slot {}: {}", self.slot, event);
                self.events.push(event.clone());
            }
            Err(err) => debug!("slot {}: instruction failed: {}", self.slot, err),
        }
        result.map(|_| ())
    }

    fn execute(
        &mut self,
        instruction: &Instruction,
        signers: &[Pubkey],
    ) -> Result<LutEvent, ProgramError> {
        if instruction.program_id != self.program_id {
            return Err(ProgramError::IncorrectProgramId);
        }
        if instruction
            .accounts
            .iter()
            .any(|meta| meta.is_signer && !signers.contains(&meta.pubkey))
        {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if instruction.accounts.len() < FIXED_ACCOUNTS_LEN {
            return Err(ProgramError::NotEnoughAccountKeys);
        }

        let fixed = &instruction.accounts[..FIXED_ACCOUNTS_LEN];
        if !system_program::check_id(&fixed[1].pubkey)
            || !address_lookup_table::program::check_id(&fixed[2].pubkey)
        {
            return Err(ProgramError::IncorrectProgramId);
        }
        let owner = fixed[0].pubkey;
        let owner_signed = fixed[0].is_signer;
        let native_table = fixed[3].pubkey;
        let metadata = fixed[4].pubkey;

        let lifecycle = LookupTableLifecycle::new(&self.program_id, &*self, &*self);
        let mut staged = Staged {
            accounts: self.accounts.clone(),
            program_id: self.program_id,
            slot: self.slot,
            rent: self.rent.clone(),
        };

        let event = match UserLookupTableInstruction::unpack(&instruction.data)? {
            UserLookupTableInstruction::CreateLookupTable { recent_slot, id } => {
                let plan = lifecycle.create(
                    &owner,
                    owner_signed,
                    &metadata,
                    &native_table,
                    recent_slot,
                    id,
                )?;
                staged.apply_create(&plan, &owner)?;
                plan.event()
            }
            UserLookupTableInstruction::ExtendLookupTable => {
                let candidates: Vec<Pubkey> = instruction.accounts[FIXED_ACCOUNTS_LEN..]
                    .iter()
                    .map(|meta| meta.pubkey)
                    .collect();
                let plan =
                    lifecycle.extend(&owner, owner_signed, &metadata, &native_table, &candidates)?;
                staged.apply_extend(&plan, &owner, &native_table)?;
                plan.event()
            }
            UserLookupTableInstruction::DeactivateLookupTable => {
                let plan = lifecycle.deactivate(&owner, owner_signed, &metadata, &native_table)?;
                staged.apply_deactivate(&plan)?;
                plan.event()
            }
            UserLookupTableInstruction::CloseLookupTable => {
                let plan = lifecycle.close(&owner, owner_signed, &metadata, &native_table)?;
                staged.apply_close(&plan, &owner)?;
                plan.event()
            }
        };

        self.accounts = staged.accounts;
        Ok(event)
    }
}

/// Account changes of one instruction, not yet committed.
struct Staged {
    accounts: HashMap<Pubkey, RawAccount>,
    program_id: Pubkey,
    slot: Slot,
    rent: Rent,
}

impl Staged {
    fn transfer(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<(), ProgramError> {
        if lamports == 0 {
            return Ok(());
        }
        let source = self
            .accounts
            .get_mut(from)
            .ok_or(ProgramError::InsufficientFunds)?;
        source.lamports = source
            .lamports
            .checked_sub(lamports)
            .ok_or(ProgramError::InsufficientFunds)?;
        let destination = self
            .accounts
            .entry(*to)
            .or_insert_with(|| RawAccount::new(0, vec![], system_program::id()));
        destination.lamports = destination
            .lamports
            .checked_add(lamports)
            .ok_or(ProgramError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Tops `address` up to rent exemption for `data_len` bytes.
    fn fund_rent(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        data_len: usize,
    ) -> Result<(), ProgramError> {
        let current = self
            .accounts
            .get(address)
            .map(|account| account.lamports)
            .unwrap_or_default();
        let required = self
            .rent
            .minimum_balance(data_len)
            .max(1)
            .saturating_sub(current);
        self.transfer(payer, address, required)
    }

    fn write_metadata(
        &mut self,
        metadata: &Pubkey,
        state: &ProgramState,
    ) -> Result<(), ProgramError> {
        let account = self
            .accounts
            .get_mut(metadata)
            .ok_or(ProgramError::UninitializedAccount)?;
        state.serialize_into(&mut account.data)
    }

    fn load_native(&self, address: &Pubkey) -> Result<NativeTable, ProgramError> {
        let account = self
            .accounts
            .get(address)
            .ok_or(ProgramError::UninitializedAccount)?;
        NativeTable::deserialize(&account.data)
    }

    fn store_native(&mut self, address: &Pubkey, table: &NativeTable) -> Result<(), ProgramError> {
        let data = table.serialize()?;
        let account = self
            .accounts
            .entry(*address)
            .or_insert_with(|| RawAccount::new(0, vec![], system_program::id()));
        account.data = data;
        account.owner = address_lookup_table::program::id();
        Ok(())
    }

    /// Native rule: an authority-signed change to an existing table.
    fn load_native_for_authority(
        &self,
        address: &Pubkey,
        authority: &Pubkey,
    ) -> Result<NativeTable, ProgramError> {
        let table = self.load_native(address)?;
        if table.meta.authority != Some(*authority) {
            return Err(ProgramError::IncorrectAuthority);
        }
        Ok(table)
    }

    fn apply_create(&mut self, plan: &CreatePlan, owner: &Pubkey) -> Result<(), ProgramError> {
        self.fund_rent(owner, &plan.metadata_address, USER_LOOKUP_TABLE_SIZE)?;
        let metadata = self
            .accounts
            .get_mut(&plan.metadata_address)
            .ok_or(ProgramError::UninitializedAccount)?;
        metadata.data = vec![0; USER_LOOKUP_TABLE_SIZE];
        metadata.owner = self.program_id;
        self.write_metadata(&plan.metadata_address, &plan.state())?;

        // The native program only accepts slots still present in the slot
        // hashes history.
        if self.slot.saturating_sub(plan.recent_slot) > MAX_ENTRIES as u64 {
            warn!("{} is not a recent slot", plan.recent_slot);
            return Err(ProgramError::InvalidInstructionData);
        }
        if self
            .accounts
            .get(&plan.native_table_address)
            .is_some_and(|account| !account.data.is_empty())
        {
            return Err(ProgramError::AccountAlreadyInitialized);
        }
        self.fund_rent(owner, &plan.native_table_address, NativeTable::data_len(0))?;
        self.store_native(
            &plan.native_table_address,
            &NativeTable::new(plan.metadata_address),
        )
    }

    fn apply_extend(
        &mut self,
        plan: &ExtendPlan,
        owner: &Pubkey,
        native_address: &Pubkey,
    ) -> Result<(), ProgramError> {
        self.write_metadata(&plan.metadata_address, &plan.state())?;

        let mut table = self.load_native_for_authority(native_address, &plan.metadata_address)?;
        if table.is_deactivated() {
            return Err(ProgramError::InvalidArgument);
        }
        if self.slot != table.meta.last_extended_slot {
            table.meta.last_extended_slot = self.slot;
            table.meta.last_extended_slot_start_index = table.addresses.len() as u8;
        }
        table.addresses.extend_from_slice(&plan.new_addresses);

        self.fund_rent(owner, native_address, NativeTable::data_len(table.addresses.len()))?;
        self.store_native(native_address, &table)
    }

    fn apply_deactivate(&mut self, plan: &DeactivatePlan) -> Result<(), ProgramError> {
        self.write_metadata(&plan.metadata_address, &plan.state())?;

        let mut table =
            self.load_native_for_authority(&plan.native_table_address, &plan.metadata_address)?;
        if table.is_deactivated() {
            return Err(ProgramError::InvalidArgument);
        }
        table.meta.deactivation_slot = self.slot;
        self.store_native(&plan.native_table_address, &table)
    }

    fn apply_close(&mut self, plan: &ClosePlan, owner: &Pubkey) -> Result<(), ProgramError> {
        let table =
            self.load_native_for_authority(&plan.native_table_address, &plan.metadata_address)?;
        // Closeable once the deactivation slot has left the slot hashes
        // history.
        let deactivation_slot = table.meta.deactivation_slot;
        if !table.is_deactivated()
            || self.slot.saturating_sub(deactivation_slot) <= MAX_ENTRIES as u64
        {
            warn!("lookup table {} is still deactivating", plan.native_table_address);
            return Err(ProgramError::InvalidArgument);
        }

        for address in [plan.native_table_address, plan.metadata_address] {
            let lamports = self
                .accounts
                .get(&address)
                .map(|account| account.lamports)
                .unwrap_or_default();
            self.transfer(&address, owner, lamports)?;
            self.accounts.remove(&address);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            error::UserLookupTableError,
            instruction::{
                close_lookup_table, create_lookup_table, deactivate_lookup_table,
                extend_lookup_table,
            },
            state::{UserLookupTable, COOLDOWN_SLOTS, MAX_ADDRESSES},
        },
    };

    const FUNDS: u64 = 10_000_000_000;

    struct Table {
        owner: Pubkey,
        metadata: Pubkey,
        native_table: Pubkey,
    }

    impl Table {
        fn extend(
            &self,
            ledger: &mut InMemoryLedger,
            candidates: &[Pubkey],
        ) -> Result<(), ProgramError> {
            ledger.process_instruction(
                &extend_lookup_table(self.owner, self.metadata, self.native_table, candidates),
                &[self.owner],
            )
        }

        fn deactivate(&self, ledger: &mut InMemoryLedger) -> Result<(), ProgramError> {
            ledger.process_instruction(
                &deactivate_lookup_table(self.owner, self.metadata, self.native_table),
                &[self.owner],
            )
        }

        fn close(&self, ledger: &mut InMemoryLedger) -> Result<(), ProgramError> {
            ledger.process_instruction(
                &close_lookup_table(self.owner, self.metadata, self.native_table),
                &[self.owner],
            )
        }

        fn state(&self, ledger: &InMemoryLedger) -> ProgramState {
            ledger.user_lookup_table(&self.metadata).unwrap()
        }

        fn table(&self, ledger: &InMemoryLedger) -> UserLookupTable {
            self.state(ledger).table().unwrap().clone()
        }

        fn addresses(&self, ledger: &InMemoryLedger) -> Vec<Pubkey> {
            ledger.native_table(&self.native_table).unwrap().addresses
        }
    }

    fn create_table(ledger: &mut InMemoryLedger, owner: Pubkey, id: u64) -> Table {
        let recent_slot = ledger.slot();
        ledger.advance_slots(1);
        let (instruction, metadata, native_table) =
            create_lookup_table(owner, id, recent_slot).unwrap();
        ledger.process_instruction(&instruction, &[owner]).unwrap();
        Table {
            owner,
            metadata,
            native_table,
        }
    }

    fn setup() -> (InMemoryLedger, Table) {
        let mut ledger = InMemoryLedger::new(LedgerConfig {
            initial_slot: 100,
            ..LedgerConfig::default()
        });
        let owner = Pubkey::new_unique();
        ledger.fund_account(&owner, FUNDS);
        let table = create_table(&mut ledger, owner, 100);
        (ledger, table)
    }

    fn not_ready() -> Result<(), ProgramError> {
        Err(UserLookupTableError::LutNotReady.into())
    }

    #[test]
    fn test_create() {
        let (ledger, table) = setup();
        let state = table.table(&ledger);
        assert_eq!(state.address_count, 0);
        assert_eq!(state.last_updated_slot, 101);
        assert_eq!(state.owner, table.owner);
        assert_eq!(state.id, 100);
        assert!(table.state(&ledger).is_active());

        let native = ledger.native_table(&table.native_table).unwrap();
        assert_eq!(native.meta.authority, Some(table.metadata));
        assert!(native.addresses.is_empty());
        assert_eq!(
            ledger.get_account(&table.metadata).unwrap().owner,
            crate::id()
        );

        let rent = Rent::default();
        assert_eq!(
            ledger.balance(&table.owner),
            FUNDS
                - rent.minimum_balance(USER_LOOKUP_TABLE_SIZE)
                - rent.minimum_balance(NativeTable::data_len(0))
        );
        assert_eq!(
            ledger.events(),
            &[LutEvent::Created {
                wrapper: table.metadata,
                lut_address: table.native_table,
                authority: table.owner,
                slot: 101,
            }]
        );
    }

    #[test]
    fn test_create_twice_fails() {
        let (mut ledger, table) = setup();
        let recent_slot = ledger.slot() - 1;
        ledger.advance_slots(1);
        let (instruction, _, _) = create_lookup_table(table.owner, 100, recent_slot).unwrap();
        assert_eq!(
            ledger.process_instruction(&instruction, &[table.owner]),
            Err(ProgramError::AccountAlreadyInitialized)
        );
    }

    #[test]
    fn test_create_many_tables_per_owner() {
        let (mut ledger, first) = setup();
        let second = create_table(&mut ledger, first.owner, 101);
        let third = create_table(&mut ledger, first.owner, 0);
        assert_ne!(first.metadata, second.metadata);
        assert_ne!(second.metadata, third.metadata);
        assert_ne!(first.native_table, third.native_table);
        assert_eq!(third.table(&ledger).id, 0);
    }

    #[test]
    fn test_create_requires_signature() {
        let mut ledger = InMemoryLedger::default();
        let owner = Pubkey::new_unique();
        ledger.fund_account(&owner, FUNDS);
        ledger.advance_slots(1);
        let (instruction, metadata, _) = create_lookup_table(owner, 0, 1).unwrap();
        assert_eq!(
            ledger.process_instruction(&instruction, &[]),
            Err(ProgramError::MissingRequiredSignature)
        );
        assert!(ledger.get_account(&metadata).is_none());
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_create_with_stale_slot() {
        let mut ledger = InMemoryLedger::default();
        let owner = Pubkey::new_unique();
        ledger.fund_account(&owner, FUNDS);
        ledger.warp_to_slot(1000).unwrap();

        let (instruction, metadata, _) = create_lookup_table(owner, 0, 10).unwrap();
        assert_eq!(
            ledger.process_instruction(&instruction, &[owner]),
            Err(ProgramError::InvalidInstructionData)
        );
        // Nothing of the partially applied instruction is kept.
        assert!(ledger.get_account(&metadata).is_none());
        assert_eq!(ledger.balance(&owner), FUNDS);

        let (instruction, _, _) = create_lookup_table(owner, 0, 1000).unwrap();
        assert_eq!(
            ledger.process_instruction(&instruction, &[owner]),
            Err(ProgramError::InvalidInstructionData)
        );

        let (instruction, _, _) = create_lookup_table(owner, 0, 1000 - 512).unwrap();
        assert_eq!(ledger.process_instruction(&instruction, &[owner]), Ok(()));
    }

    #[test]
    fn test_create_without_funds() {
        let mut ledger = InMemoryLedger::default();
        let owner = Pubkey::new_unique();
        ledger.advance_slots(1);
        let (instruction, metadata, _) = create_lookup_table(owner, 0, 1).unwrap();
        assert_eq!(
            ledger.process_instruction(&instruction, &[owner]),
            Err(ProgramError::InsufficientFunds)
        );
        assert!(ledger.get_account(&metadata).is_none());
    }

    #[test]
    fn test_extend_before_cooldown_is_not_ready() {
        let (mut ledger, table) = setup();
        let before = table.table(&ledger);

        assert_eq!(table.extend(&mut ledger, &[Pubkey::new_unique()]), not_ready());
        ledger.advance_slots(COOLDOWN_SLOTS - 1);
        assert_eq!(table.extend(&mut ledger, &[Pubkey::new_unique()]), not_ready());

        assert_eq!(table.table(&ledger), before);
        assert!(table.addresses(&ledger).is_empty());
    }

    #[test]
    fn test_extend_duplicates_only() {
        let (mut ledger, table) = setup();
        let [a, b] = [(); 2].map(|_| Pubkey::new_unique());
        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[a, b]).unwrap();
        let before = table.table(&ledger);

        ledger.advance_slots(COOLDOWN_SLOTS);
        assert_eq!(
            table.extend(&mut ledger, &[b, a, a]),
            Err(UserLookupTableError::NoNewAddresses.into())
        );
        // The failed extend does not restart the cooldown.
        assert_eq!(table.table(&ledger), before);
        assert_eq!(table.addresses(&ledger), vec![a, b]);
    }

    #[test]
    fn test_extend_counts_only_new_addresses() {
        let (mut ledger, table) = setup();
        let [a, b, c, d] = [(); 4].map(|_| Pubkey::new_unique());
        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[a, b]).unwrap();

        ledger.advance_slots(COOLDOWN_SLOTS + 3);
        table.extend(&mut ledger, &[a, c, b, d, c]).unwrap();

        let state = table.table(&ledger);
        assert_eq!(state.address_count, 4);
        assert_eq!(state.last_updated_slot, ledger.slot());
        assert_eq!(table.addresses(&ledger), vec![a, b, c, d]);
        assert_eq!(
            ledger.events().last(),
            Some(&LutEvent::Extended {
                wrapper: table.metadata,
                addresses_added: 2,
                total_addresses: 4,
            })
        );
    }

    #[test]
    fn test_overlapping_batches() {
        let (mut ledger, table) = setup();
        let [a, b, c] = [(); 3].map(|_| Pubkey::new_unique());
        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[a, b]).unwrap();
        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[a, c]).unwrap();

        assert_eq!(table.table(&ledger).address_count, 3);
        assert_eq!(table.addresses(&ledger), vec![a, b, c]);
        assert_eq!(
            ledger.lookup_table_account(&table.metadata),
            Some(UserLookupTableAccount {
                key: table.metadata,
                native_table: table.native_table,
                addresses: vec![a, b, c],
            })
        );
    }

    #[test]
    fn test_lifecycle_scenario() {
        let (mut ledger, table) = setup();
        let [x, y, z] = [(); 3].map(|_| Pubkey::new_unique());
        assert_eq!(table.table(&ledger).address_count, 0);

        assert_eq!(table.extend(&mut ledger, &[x]), not_ready());

        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[x, y]).unwrap();
        assert_eq!(table.table(&ledger).address_count, 2);

        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[x, z]).unwrap();
        assert_eq!(table.table(&ledger).address_count, 3);
        assert_eq!(table.addresses(&ledger), vec![x, y, z]);
    }

    #[test]
    fn test_extend_pays_rent_for_new_entries() {
        let (mut ledger, table) = setup();
        ledger.advance_slots(COOLDOWN_SLOTS);
        let owner_before = ledger.balance(&table.owner);
        let table_before = ledger.balance(&table.native_table);

        table
            .extend(&mut ledger, &[Pubkey::new_unique(), Pubkey::new_unique()])
            .unwrap();
        let rent = Rent::default();
        let expected_table_balance = rent.minimum_balance(NativeTable::data_len(2));
        assert_eq!(ledger.balance(&table.native_table), expected_table_balance);
        assert_eq!(
            ledger.balance(&table.owner),
            owner_before - (expected_table_balance - table_before)
        );
    }

    #[test]
    fn test_extend_capacity() {
        let (mut ledger, table) = setup();
        let mut stored = 0;
        while stored < MAX_ADDRESSES {
            ledger.advance_slots(COOLDOWN_SLOTS);
            let batch: Vec<Pubkey> = (0..30usize.min(MAX_ADDRESSES - stored))
                .map(|_| Pubkey::new_unique())
                .collect();
            table.extend(&mut ledger, &batch).unwrap();
            stored += batch.len();
        }
        assert_eq!(table.table(&ledger).address_count, MAX_ADDRESSES as u64);

        ledger.advance_slots(COOLDOWN_SLOTS);
        assert_eq!(
            table.extend(&mut ledger, &[Pubkey::new_unique()]),
            Err(UserLookupTableError::MaxAddressesExceeded.into())
        );
    }

    #[test]
    fn test_extend_by_other_signer() {
        let (mut ledger, table) = setup();
        ledger.advance_slots(COOLDOWN_SLOTS);
        let intruder = Pubkey::new_unique();
        assert_eq!(
            ledger.process_instruction(
                &extend_lookup_table(
                    intruder,
                    table.metadata,
                    table.native_table,
                    &[Pubkey::new_unique()]
                ),
                &[intruder],
            ),
            Err(ProgramError::IncorrectAuthority)
        );
    }

    #[test]
    fn test_extend_with_swapped_native_table() {
        let (mut ledger, table) = setup();
        let other = create_table(&mut ledger, table.owner, 7);
        ledger.advance_slots(COOLDOWN_SLOTS);
        assert_eq!(
            ledger.process_instruction(
                &extend_lookup_table(
                    table.owner,
                    table.metadata,
                    other.native_table,
                    &[Pubkey::new_unique()]
                ),
                &[table.owner],
            ),
            Err(UserLookupTableError::InvalidLookupTable.into())
        );
    }

    #[test]
    fn test_deactivate() {
        let (mut ledger, table) = setup();
        ledger.advance_slots(COOLDOWN_SLOTS);
        table.extend(&mut ledger, &[Pubkey::new_unique()]).unwrap();

        ledger.advance_slots(3);
        table.deactivate(&mut ledger).unwrap();
        let state = table.state(&ledger);
        assert!(!state.is_active());
        assert_eq!(state.table().unwrap().address_count, 1);
        assert_eq!(
            ledger.native_table(&table.native_table).unwrap().meta.deactivation_slot,
            ledger.slot()
        );

        assert_eq!(
            table.deactivate(&mut ledger),
            Err(UserLookupTableError::TableDeactivated.into())
        );
        ledger.advance_slots(COOLDOWN_SLOTS);
        assert_eq!(
            table.extend(&mut ledger, &[Pubkey::new_unique()]),
            Err(UserLookupTableError::TableDeactivated.into())
        );
    }

    #[test]
    fn test_close() {
        let (mut ledger, table) = setup();
        assert_eq!(
            table.close(&mut ledger),
            Err(UserLookupTableError::TableNotDeactivated.into())
        );

        table.deactivate(&mut ledger).unwrap();
        assert_eq!(table.close(&mut ledger), Err(ProgramError::InvalidArgument));
        ledger.advance_slots(MAX_ENTRIES as u64);
        assert_eq!(table.close(&mut ledger), Err(ProgramError::InvalidArgument));

        ledger.advance_slots(1);
        table.close(&mut ledger).unwrap();
        assert!(ledger.get_account(&table.metadata).is_none());
        assert!(ledger.get_account(&table.native_table).is_none());
        assert_eq!(ledger.balance(&table.owner), FUNDS);
        assert_eq!(
            ledger.events().last(),
            Some(&LutEvent::Closed {
                wrapper: table.metadata,
                lut_address: table.native_table,
            })
        );
    }

    #[test]
    fn test_close_then_recreate() {
        let (mut ledger, table) = setup();
        table.deactivate(&mut ledger).unwrap();
        ledger.advance_slots(MAX_ENTRIES as u64 + 1);
        table.close(&mut ledger).unwrap();

        let recreated = create_table(&mut ledger, table.owner, 100);
        assert_eq!(recreated.metadata, table.metadata);
        assert_ne!(recreated.native_table, table.native_table);
        assert_eq!(recreated.table(&ledger).address_count, 0);
    }

    #[test]
    fn test_warp_backwards() {
        let mut ledger = InMemoryLedger::default();
        ledger.warp_to_slot(10).unwrap();
        assert_eq!(ledger.warp_to_slot(9), Err(ProgramError::InvalidArgument));
        assert_eq!(ledger.slot(), 10);
    }

    #[test]
    fn test_rejects_foreign_program_instruction() {
        let mut ledger = InMemoryLedger::default();
        let mut instruction = deactivate_lookup_table(
            Pubkey::new_unique(),
            Pubkey::new_unique(),
            Pubkey::new_unique(),
        );
        instruction.program_id = Pubkey::new_unique();
        assert_eq!(
            ledger.process_instruction(&instruction, &[]),
            Err(ProgramError::IncorrectProgramId)
        );
    }
}
