//! CLI Exit Code Registry
//!
//! Single source of truth for `promolens` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Success                                          |
//! | 1    | General error (unspecified)                      |
//! | 2    | Usage error (bad args; also clap's own errors)   |
//! | 3    | View config could not be parsed or is invalid    |
//! | 4    | Data file unreadable or malformed                |
//! | 5    | No transactions left after filtering (opt-in)    |
//! | 6    | Drill-down target not found                      |

use promolens_analytics::AnalyticsError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// View config parse or validation failure.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Data file missing, unsupported, or a record failed to decode.
pub const EXIT_DATA: u8 = 4;

/// Filtered subset is empty and `--fail-on-empty` was given.
pub const EXIT_EMPTY: u8 = 5;

/// `drill --by/--value` named a group with no transactions.
pub const EXIT_NOT_FOUND: u8 = 6;

/// Map a library error to its exit code.
pub fn analytics_exit_code(err: &AnalyticsError) -> u8 {
    match err {
        AnalyticsError::ConfigParse(_) | AnalyticsError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        AnalyticsError::DataParse { .. } | AnalyticsError::UnknownFormat(_) => EXIT_DATA,
        AnalyticsError::Io(_) => EXIT_DATA,
    }
}
