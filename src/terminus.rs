//! Link endpoint descriptors.
//!
//! A [`Terminus`] names one end of a link. Its address is either fixed by the
//! caller or, for a dynamic terminus, assigned by the peer when the attach
//! completes.

use serde::{Deserialize, Serialize};

/// Default byte limit applied when formatting a terminus for diagnostics.
pub const TERMINUS_FORMAT_LIMIT: usize = 200;

/// Endpoint descriptor for one side of a link.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminus {
    address: Option<String>,
    dynamic: bool,
}

impl Terminus {
    /// A terminus with neither an address nor a dynamic request.
    #[must_use]
    pub fn anonymous() -> Self { Self::default() }

    /// A terminus asking the peer to assign an address.
    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            address: None,
            dynamic: true,
        }
    }

    /// A terminus bound to a fixed address.
    #[must_use]
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            dynamic: false,
        }
    }

    /// Record the address assigned by the peer, keeping the dynamic flag.
    #[must_use]
    pub fn assigned(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Address carried by this terminus, if any.
    #[must_use]
    pub fn address(&self) -> Option<&str> { self.address.as_deref() }

    /// Whether the address is (or will be) chosen by the peer.
    #[must_use]
    pub fn is_dynamic(&self) -> bool { self.dynamic }

    /// Render the terminus for logging, truncated to at most `limit` bytes.
    ///
    /// Truncation never splits a UTF-8 character.
    ///
    /// # Examples
    ///
    /// ```
    /// use linkwire::terminus::Terminus;
    ///
    /// let t = Terminus::with_address("examples");
    /// assert_eq!(t.format_bounded(200), "{examples}");
    /// assert_eq!(Terminus::dynamic().format_bounded(200), "{<dynamic>}");
    /// assert_eq!(t.format_bounded(4), "{exa");
    /// ```
    #[must_use]
    pub fn format_bounded(&self, limit: usize) -> String {
        let mut text = match (&self.address, self.dynamic) {
            (Some(addr), true) => format!("{{{addr} (dynamic)}}"),
            (Some(addr), false) => format!("{{{addr}}}"),
            (None, true) => "{<dynamic>}".to_owned(),
            (None, false) => "{<none>}".to_owned(),
        };
        if text.len() > limit {
            let mut cut = limit;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        text
    }
}

impl std::fmt::Display for Terminus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_bounded(TERMINUS_FORMAT_LIMIT))
    }
}

/// Format an optional terminus the way attach diagnostics expect.
pub(crate) fn describe(terminus: Option<&Terminus>) -> String {
    terminus.map(ToString::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Terminus::anonymous(), "{<none>}")]
    #[case(Terminus::dynamic(), "{<dynamic>}")]
    #[case(Terminus::with_address("stream"), "{stream}")]
    #[case(Terminus::dynamic().assigned("amqp://peer/replies"), "{amqp://peer/replies (dynamic)}")]
    fn formats_terminus(#[case] terminus: Terminus, #[case] expected: &str) {
        assert_eq!(terminus.to_string(), expected);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let t = Terminus::with_address("héllo");
        // "{h" is two bytes, 'é' occupies bytes 2..4
        assert_eq!(t.format_bounded(3), "{h");
    }

    #[test]
    fn missing_terminus_describes_as_empty() {
        assert_eq!(describe(None), "");
        assert_eq!(describe(Some(&Terminus::with_address("a"))), "{a}");
    }

    #[test]
    fn assigned_keeps_dynamic_flag() {
        let t = Terminus::dynamic().assigned("x");
        assert!(t.is_dynamic());
        assert_eq!(t.address(), Some("x"));
    }
}
