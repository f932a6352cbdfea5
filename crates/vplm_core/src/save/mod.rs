// Session Save/Load System for pyVPLM
// Plain text: 18 `---` sections, `+++` groups, `|||` model records, `|` fields

pub mod array;
pub mod codec;
pub mod error;
pub mod format;
pub mod manager;
pub mod path;

#[cfg(test)]
mod tests;

pub use error::{FieldError, SaveError};
pub use format::{decode_session, encode_session};
pub use manager::{load_session, save_session, SessionStore};
pub use path::{open_unique, with_copy_marker};

/// Number of `---` delimited sections in a valid session file
pub const SECTION_COUNT: usize = 18;

pub const SECTION_SEP: &str = "---";
pub const GROUP_SEP: &str = "+++";
pub const RECORD_SEP: &str = "|||";
pub const FIELD_SEP: char = '|';

/// Token written for absent optional values
pub const NONE_TOKEN: &str = "None";
/// Placeholder for the unused bounds/value slot of a parameter line
pub const PLACEHOLDER: &str = "#";
