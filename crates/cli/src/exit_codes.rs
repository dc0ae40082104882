//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Description                                              |
//! |------|----------------------------------------------------------|
//! | 0    | Success                                                  |
//! | 1    | General error (unspecified)                              |
//! | 2    | CLI usage error (bad args)                               |
//! | 3    | Input file missing or unreadable                         |
//! | 4    | Malformed input rejected by strict loading               |
//! | 5    | Invalid job config                                       |
//! | 6    | Variances found (only with `--fail-on-variance`)         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `recon_exit_code` or the relevant command

use stocksync_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. cannot write output).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting options.
pub const EXIT_USAGE: u8 = 2;

/// An inventory or config file does not exist or cannot be read.
pub const EXIT_RESOURCE: u8 = 3;

/// Strict mode rejected a row, a number, an encoding, or a duplicate SKU.
pub const EXIT_MALFORMED: u8 = 4;

/// Job config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// Reconciliation produced variance entries and `--fail-on-variance` is set.
pub const EXIT_VARIANCE: u8 = 6;

/// Map a ReconError to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::Resource { .. } => EXIT_RESOURCE,
        ReconError::MalformedRow { .. }
        | ReconError::InvalidNumber { .. }
        | ReconError::InvalidEncoding { .. }
        | ReconError::DuplicateSku { .. } => EXIT_MALFORMED,
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_by_category() {
        assert_eq!(recon_exit_code(&ReconError::resource("a.csv", "gone")), EXIT_RESOURCE);
        assert_eq!(
            recon_exit_code(&ReconError::MalformedRow {
                source: "a.csv".into(),
                line: 1,
                field_count: 2,
            }),
            EXIT_MALFORMED
        );
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_INVALID_CONFIG);
    }
}
