//! Process exit codes of sdr
//!
//! The numbers are part of the command-line interface: scripts branch on
//! them, so a code never changes meaning once released.

use splunkd_core::Error;

/// How an `sdr` invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Anything not covered below, including unexpected server errors
    GeneralError = 1,

    /// Bad flags or settings: sharing mode, scheme, header, key without cert
    UsageError = 2,

    /// Worth retrying: refused connection, DNS, TLS, HTTP 502-504
    NetworkError = 3,

    /// Login rejected, not logged in, or HTTP 401/403
    AuthError = 4,

    /// Unknown resource (HTTP 404) or profile
    NotFound = 5,

    /// HTTP 409
    Conflict = 6,

    /// The transport cannot do what was asked
    UnsupportedFeature = 7,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// The code for a raw value, if it is one sdr uses
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            3 => Some(Self::NetworkError),
            4 => Some(Self::AuthError),
            5 => Some(Self::NotFound),
            6 => Some(Self::Conflict),
            7 => Some(Self::UnsupportedFeature),
            _ => None,
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        Self::from_i32(err.exit_code()).unwrap_or(Self::GeneralError)
    }
}
