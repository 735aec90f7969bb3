// Exit code registry (single source of truth)
//
// Scripts depend on these staying stable; add new codes at the end.

/// Operation completed.
pub const EXIT_SUCCESS: u8 = 0;

/// Generic failure.
pub const EXIT_ERROR: u8 = 1;

/// Bad arguments: unknown column/row/worksheet, unsupported extension.
pub const EXIT_USAGE: u8 = 2;

/// Filesystem failure reading or writing state/files.
pub const EXIT_IO: u8 = 3;

/// Import format failure: no header row, empty sheet.
pub const EXIT_FORMAT: u8 = 4;

/// Enrichment failed: validation, or no provider returned valid data.
pub const EXIT_ENRICH: u8 = 5;

/// No ranked enrichment provider has an API key.
pub const EXIT_MISSING_KEY: u8 = 6;
