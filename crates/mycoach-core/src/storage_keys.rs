//! Storage slot conventions.
//!
//! The whole application state lives in a single key-value slot. The key
//! carries its own generation suffix; there is no version field inside the
//! document itself.

/// Key of the serialized `AppState` document.
pub const APP_STATE: &str = "mycoach_data_v2";

/// Last raw document that `load` could not carry over in full. Written
/// before anything unreadable is discarded, never read back by the app.
pub const APP_STATE_BACKUP: &str = "mycoach_data_v2_backup";
