//! Length-bounded names for runtime creation calls.
//!
//! The runtime copies names into fixed-size, NUL-terminated buffers. Overlong names
//! are truncated when a [`BoundedName`] is constructed instead of being rejected by
//! the runtime, so the text handed across the boundary always fits.

use log::warn;
use std::fmt;

/// Buffer size for action-set names, terminator included
pub const MAX_ACTION_SET_NAME_SIZE: usize = 64;
pub const MAX_LOCALIZED_ACTION_SET_NAME_SIZE: usize = 128;
pub const MAX_ACTION_NAME_SIZE: usize = 64;
pub const MAX_LOCALIZED_ACTION_NAME_SIZE: usize = 128;

pub type ActionSetName = BoundedName<MAX_ACTION_SET_NAME_SIZE>;
pub type LocalizedActionSetName = BoundedName<MAX_LOCALIZED_ACTION_SET_NAME_SIZE>;
pub type ActionName = BoundedName<MAX_ACTION_NAME_SIZE>;
pub type LocalizedActionName = BoundedName<MAX_LOCALIZED_ACTION_NAME_SIZE>;

/// UTF-8 string holding at most `CAP - 1` bytes.
///
/// Truncation happens on write and always lands on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedName<const CAP: usize> {
    value: String,
    truncated: bool,
}

impl<const CAP: usize> BoundedName<CAP> {
    /// Maximum number of content bytes
    pub const MAX_LEN: usize = CAP - 1;

    pub fn new(text: &str) -> Self {
        if text.len() <= Self::MAX_LEN {
            return Self {
                value: text.to_string(),
                truncated: false,
            };
        }

        let mut end = Self::MAX_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        warn!(
            "Name '{}' exceeds {} bytes, truncating to '{}'",
            text,
            Self::MAX_LEN,
            &text[..end]
        );
        Self {
            value: text[..end].to_string(),
            truncated: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const CAP: usize> fmt::Display for BoundedName<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<const CAP: usize> AsRef<str> for BoundedName<CAP> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
