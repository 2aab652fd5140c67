//! Vendor status codes and their error mapping.

use std::fmt;

use thiserror::Error;

/// Raw status codes returned by the vendor frame-lock library.
///
/// The numeric values mirror the vendor's header so log lines can be
/// matched against driver documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DriverStatus {
    /// The call succeeded.
    Ok = 0,
    /// Generic failure.
    Error = -1,
    /// The vendor library could not be loaded.
    LibraryNotFound = -2,
    /// The entry point exists but is not implemented on this platform.
    NoImplementation = -3,
    /// The library was used before its process-wide initialization.
    ApiNotInitialized = -4,
    /// An argument was rejected.
    InvalidArgument = -5,
    /// No capable device was found.
    DeviceNotFound = -6,
    /// A handle was stale or malformed.
    InvalidHandle = -8,
    /// The operation is not supported on this device.
    NotSupported = -104,
}

/// Coarse classification of a status code, used for policy decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// The call succeeded.
    Ok,
    /// The driver rejected this particular call.
    Rejected,
    /// The vendor library is unusable (missing or uninitialized).
    Unavailable,
    /// The hardware or device cannot perform the operation at all.
    Unsupported,
}

impl DriverStatus {
    /// Numeric value as the vendor reports it.
    #[inline]
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Coarse classification of this status.
    pub fn kind(self) -> StatusKind {
        match self {
            DriverStatus::Ok => StatusKind::Ok,
            DriverStatus::Error | DriverStatus::InvalidArgument | DriverStatus::InvalidHandle => {
                StatusKind::Rejected
            }
            DriverStatus::LibraryNotFound
            | DriverStatus::NoImplementation
            | DriverStatus::ApiNotInitialized => StatusKind::Unavailable,
            DriverStatus::DeviceNotFound | DriverStatus::NotSupported => StatusKind::Unsupported,
        }
    }

    /// Human-readable description, the vendor error-message analog.
    pub fn message(self) -> &'static str {
        match self {
            DriverStatus::Ok => "success",
            DriverStatus::Error => "generic error",
            DriverStatus::LibraryNotFound => "vendor library not found",
            DriverStatus::NoImplementation => "no implementation on this platform",
            DriverStatus::ApiNotInitialized => "vendor library not initialized",
            DriverStatus::InvalidArgument => "invalid argument",
            DriverStatus::DeviceNotFound => "no capable device found",
            DriverStatus::InvalidHandle => "invalid handle",
            DriverStatus::NotSupported => "not supported on this device",
        }
    }

    /// Turns a status into a result, tagging failures with the call name.
    pub fn into_result(self, call: &'static str) -> DriverResult<()> {
        if self == DriverStatus::Ok {
            Ok(())
        } else {
            Err(DriverError { call, status: self })
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// A vendor call failed; carries the call name and the raw status.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{call} failed: {status}")]
pub struct DriverError {
    /// Name of the vendor call that failed.
    pub call: &'static str,
    /// Status the vendor returned.
    pub status: DriverStatus,
}

/// Result type alias for vendor calls.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_partition_the_status_space() {
        assert_eq!(DriverStatus::Ok.kind(), StatusKind::Ok);
        assert_eq!(DriverStatus::Error.kind(), StatusKind::Rejected);
        assert_eq!(DriverStatus::InvalidArgument.kind(), StatusKind::Rejected);
        assert_eq!(DriverStatus::InvalidHandle.kind(), StatusKind::Rejected);
        assert_eq!(DriverStatus::LibraryNotFound.kind(), StatusKind::Unavailable);
        assert_eq!(DriverStatus::ApiNotInitialized.kind(), StatusKind::Unavailable);
        assert_eq!(DriverStatus::NoImplementation.kind(), StatusKind::Unavailable);
        assert_eq!(DriverStatus::DeviceNotFound.kind(), StatusKind::Unsupported);
        assert_eq!(DriverStatus::NotSupported.kind(), StatusKind::Unsupported);
    }

    #[test]
    fn errors_carry_call_name_message_and_code() {
        let error = DriverStatus::InvalidArgument
            .into_result("join_swap_group")
            .unwrap_err();
        let rendered = error.to_string();
        assert!(rendered.contains("join_swap_group"));
        assert!(rendered.contains("invalid argument"));
        assert!(rendered.contains("-5"));
    }

    #[test]
    fn ok_converts_to_unit_result() {
        assert!(DriverStatus::Ok.into_result("present").is_ok());
    }
}
