//! URL-encoded strings
//!
//! Tracking by hand whether a string has already been percent-encoded is
//! error prone. `UrlEncoded` carries that fact in the type: a value of this
//! type is encoded exactly once, converting one `UrlEncoded` into another is
//! the identity, and appending plain text encodes the plain side first.
//!
//! There is deliberately no way to interpolate into a `UrlEncoded`. Build the
//! string yourself, encoding the pieces that need it, then wrap the result
//! with [`UrlEncoded::skip_encode`]:
//!
//! ```
//! use splunkd_core::UrlEncoded;
//!
//! let host = "splunk.example.com";
//! let authority = UrlEncoded::skip_encode(format!("https://{host}:8089"));
//! assert_eq!(authority + "/services/apps/local", "https://splunk.example.com:8089/services/apps/local");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::ops::Add;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except unreserved characters and the path separator
const PATH_UNSAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// A string that has been percent-encoded exactly once
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UrlEncoded(String);

impl UrlEncoded {
    /// Percent-encode `raw`.
    pub fn new(raw: &str) -> Self {
        Self(encode(raw))
    }

    /// Wrap a string the caller has already made URL safe.
    pub fn skip_encode(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// The text with percent escapes replaced by the characters they stand for
    pub fn decoded(&self) -> Cow<'_, str> {
        percent_decode_str(&self.0).decode_utf8_lossy()
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_UNSAFE).to_string()
}

impl From<&str> for UrlEncoded {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for UrlEncoded {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&String> for UrlEncoded {
    fn from(raw: &String) -> Self {
        Self::new(raw)
    }
}

impl From<&UrlEncoded> for UrlEncoded {
    fn from(encoded: &UrlEncoded) -> Self {
        encoded.clone()
    }
}

impl From<UrlEncoded> for String {
    fn from(encoded: UrlEncoded) -> Self {
        encoded.0
    }
}

impl AsRef<str> for UrlEncoded {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UrlEncoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for UrlEncoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UrlEncoded({:?})", self.decoded())
    }
}

impl PartialEq<str> for UrlEncoded {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UrlEncoded {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for UrlEncoded {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

impl Add for UrlEncoded {
    type Output = UrlEncoded;

    fn add(mut self, rhs: UrlEncoded) -> UrlEncoded {
        self.0.push_str(&rhs.0);
        self
    }
}

impl Add<&UrlEncoded> for UrlEncoded {
    type Output = UrlEncoded;

    fn add(mut self, rhs: &UrlEncoded) -> UrlEncoded {
        self.0.push_str(&rhs.0);
        self
    }
}

impl Add<&str> for UrlEncoded {
    type Output = UrlEncoded;

    fn add(mut self, rhs: &str) -> UrlEncoded {
        self.0.push_str(&encode(rhs));
        self
    }
}

impl Add<String> for UrlEncoded {
    type Output = UrlEncoded;

    fn add(self, rhs: String) -> UrlEncoded {
        self + rhs.as_str()
    }
}

impl Add<UrlEncoded> for &str {
    type Output = UrlEncoded;

    fn add(self, rhs: UrlEncoded) -> UrlEncoded {
        UrlEncoded(encode(self) + rhs.as_str())
    }
}

impl Add<UrlEncoded> for String {
    type Output = UrlEncoded;

    fn add(self, rhs: UrlEncoded) -> UrlEncoded {
        self.as_str() + rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_unsafe_characters() {
        assert_eq!(UrlEncoded::new("ab c"), "ab%20c");
        assert_eq!(UrlEncoded::new("/a/b c/d"), "/a/b%20c/d");
        assert_eq!(UrlEncoded::new("search * | head 1"), "search%20%2A%20%7C%20head%201");
        assert_eq!(UrlEncoded::new("a-b_c.d~e"), "a-b_c.d~e");
    }

    #[test]
    fn test_encoding_is_idempotent() {
        for raw in ["ab c", "100%", "/servicesNS/boris/search", "ü&=?"] {
            let once = UrlEncoded::new(raw);
            let twice = UrlEncoded::from(once.clone());
            assert_eq!(once, twice);
            assert_eq!(UrlEncoded::from(&twice), once);
        }
    }

    #[test]
    fn test_skip_encode_keeps_text() {
        let encoded = UrlEncoded::skip_encode("https://[::1]:8089");
        assert_eq!(encoded, "https://[::1]:8089");
    }

    #[test]
    fn test_add_plain_on_the_right_encodes_it() {
        let joined = UrlEncoded::new("ab c") + "de f";
        assert_eq!(joined, UrlEncoded::new("ab cde f"));
        assert_eq!(joined, "ab%20cde%20f");
    }

    #[test]
    fn test_add_plain_on_the_left_encodes_it() {
        let joined = "ab c" + UrlEncoded::new("de f");
        assert_eq!(joined, UrlEncoded::new("ab cde f"));

        let joined = String::from("ab c") + UrlEncoded::new("de f");
        assert_eq!(joined, "ab%20cde%20f");
    }

    #[test]
    fn test_add_two_encoded_values_does_not_reencode() {
        let joined = UrlEncoded::new("a%b") + UrlEncoded::new("c d");
        assert_eq!(joined, "a%25bc%20d");
    }

    #[test]
    fn test_debug_shows_decoded_text() {
        let encoded = UrlEncoded::new("ab c");
        assert_eq!(format!("{encoded:?}"), "UrlEncoded(\"ab c\")");
        assert_eq!(encoded.to_string(), "ab%20c");
    }
}
