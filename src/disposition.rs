//! Delivery outcomes.

use serde::{Deserialize, Serialize};

/// AMQP descriptor code of the `accepted` outcome.
pub const ACCEPTED_CODE: u64 = 0x24;
/// AMQP descriptor code of the `rejected` outcome.
pub const REJECTED_CODE: u64 = 0x25;
/// AMQP descriptor code of the `released` outcome.
pub const RELEASED_CODE: u64 = 0x26;
/// AMQP descriptor code of the `modified` outcome.
pub const MODIFIED_CODE: u64 = 0x27;

/// Verdict attached to a delivery by its receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    Accepted,
    Rejected,
    Released,
    Modified,
    /// Any code the adaptor does not recognise, including "no outcome yet".
    Unknown(u64),
}

impl Disposition {
    /// Decode a wire outcome code.
    ///
    /// ```
    /// use linkwire::disposition::Disposition;
    ///
    /// assert_eq!(Disposition::from_code(0x24), Disposition::Accepted);
    /// assert_eq!(Disposition::from_code(0), Disposition::Unknown(0));
    /// ```
    #[must_use]
    pub fn from_code(code: u64) -> Self {
        match code {
            ACCEPTED_CODE => Self::Accepted,
            REJECTED_CODE => Self::Rejected,
            RELEASED_CODE => Self::Released,
            MODIFIED_CODE => Self::Modified,
            other => Self::Unknown(other),
        }
    }

    /// Wire code for this outcome.
    #[must_use]
    pub fn code(self) -> u64 {
        match self {
            Self::Accepted => ACCEPTED_CODE,
            Self::Rejected => REJECTED_CODE,
            Self::Released => RELEASED_CODE,
            Self::Modified => MODIFIED_CODE,
            Self::Unknown(code) => code,
        }
    }

    /// Name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Accepted => "ACCEPTED",
            Self::Rejected => "REJECTED",
            Self::Released => "RELEASED",
            Self::Modified => "MODIFIED",
            Self::Unknown(_) => "<UNKNOWN>",
        }
    }

    /// Whether the receiver declined to process the message.
    #[must_use]
    pub fn is_non_accepting(self) -> bool {
        matches!(self, Self::Rejected | Self::Released | Self::Modified)
    }
}

impl From<u64> for Disposition {
    fn from(code: u64) -> Self { Self::from_code(code) }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}
