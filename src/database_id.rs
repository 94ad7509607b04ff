//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of a fuel purchase record.
pub type FuelRecordId = DatabaseId;
/// The ID of a toll payment record.
pub type TollRecordId = DatabaseId;
