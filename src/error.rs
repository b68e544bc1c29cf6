use {solana_program::program_error::ProgramError, spl_program_error::*};

// Account state and instruction data are bincode-encoded, and there is no
// `ProgramError` variant for bincode failures. Until one exists, they are
// surfaced through `ProgramError::BorshIoError`.
pub trait MapToProgramIoError<T> {
    fn map_to_program_io_error(self) -> Result<T, ProgramError>;
}
impl<T> MapToProgramIoError<T> for Result<T, bincode::Error> {
    fn map_to_program_io_error(self) -> Result<T, ProgramError> {
        self.map_err(|e| ProgramError::BorshIoError(e.to_string()))
    }
}

#[spl_program_error]
pub enum UserLookupTableError {
    /// The native lookup table does not match the one bound to the metadata
    /// account, or its data could not be read
    #[error("Invalid lookup table address")]
    InvalidLookupTable,
    /// Cooldown since the last update has not elapsed
    #[error("Lookup table not ready, cooldown period has not passed")]
    LutNotReady,
    /// Extending would push the native table past its capacity
    #[error("Maximum addresses exceeded (256 limit)")]
    MaxAddressesExceeded,
    /// Every candidate address is already stored in the table
    #[error("No new addresses to add")]
    NoNewAddresses,
    /// The lookup table has been deactivated
    #[error("Lookup table has been deactivated")]
    TableDeactivated,
    /// The lookup table must be deactivated before it can be closed
    #[error("Lookup table has not been deactivated")]
    TableNotDeactivated,
    /// No off-curve address exists for the derivation inputs
    #[error("Unable to derive a program address")]
    DerivationFailed,
}
