//! Unified error codes for Pack & Go
//!
//! Error codes are shared by the server, the notification client and the
//! browser frontend. They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account / company errors
//! - 4xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Request body could not be parsed or failed validation
    ValidationFailed = 2,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// Session token has expired
    TokenExpired = 1003,
    /// Session token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 3xxx: Account ====================
    /// Company not found
    CompanyNotFound = 3002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Status transition is not allowed for this actor / state
    InvalidTransition = 4002,
    /// Confirmation requires one of the preferred dates
    ConfirmedDateRequired = 4003,
    /// Confirmed date is not one of the preferred dates
    ConfirmedDateNotPreferred = 4004,
    /// Order cannot be deleted in its current status
    OrderNotDeletable = 4005,
    /// Preferred dates are missing, duplicated or too many
    InvalidPreferredDates = 4006,
    /// Review is only possible on completed orders
    ReviewNotAllowed = 4007,
    /// Order already carries a review
    ReviewAlreadySubmitted = 4008,

    // ==================== 9xxx: System ====================
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::TokenExpired => "Session token has expired",
            ErrorCode::TokenInvalid => "Session token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Role required",

            // Account
            ErrorCode::CompanyNotFound => "Company not found",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Status transition not allowed",
            ErrorCode::ConfirmedDateRequired => "A confirmed date is required",
            ErrorCode::ConfirmedDateNotPreferred => {
                "Confirmed date must be one of the preferred dates"
            }
            ErrorCode::OrderNotDeletable => "Order cannot be deleted in its current status",
            ErrorCode::InvalidPreferredDates => "Between one and three distinct dates required",
            ErrorCode::ReviewNotAllowed => "Only completed orders can be reviewed",
            ErrorCode::ReviewAlreadySubmitted => "Order has already been reviewed",

            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ErrorCode::ValidationFailed),
            8 => Ok(ErrorCode::ValueOutOfRange),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            3002 => Ok(ErrorCode::CompanyNotFound),

            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::ConfirmedDateRequired),
            4004 => Ok(ErrorCode::ConfirmedDateNotPreferred),
            4005 => Ok(ErrorCode::OrderNotDeletable),
            4006 => Ok(ErrorCode::InvalidPreferredDates),
            4007 => Ok(ErrorCode::ReviewNotAllowed),
            4008 => Ok(ErrorCode::ReviewAlreadySubmitted),

            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::CompanyNotFound.code(), 3002);
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::InvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "4002");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("4005").unwrap();
        assert_eq!(code, ErrorCode::OrderNotDeletable);

        let code: ErrorCode = serde_json::from_str("9002").unwrap();
        assert_eq!(code, ErrorCode::DatabaseError);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("4999");
        assert!(result.is_err());
    }

    #[test]
    fn test_every_code_survives_u16_conversion() {
        let codes = [
            ErrorCode::ValidationFailed,
            ErrorCode::ValueOutOfRange,
            ErrorCode::TokenExpired,
            ErrorCode::RoleRequired,
            ErrorCode::CompanyNotFound,
            ErrorCode::ConfirmedDateRequired,
            ErrorCode::ConfirmedDateNotPreferred,
            ErrorCode::InvalidPreferredDates,
            ErrorCode::ReviewNotAllowed,
            ErrorCode::ReviewAlreadySubmitted,
            ErrorCode::DatabaseError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
