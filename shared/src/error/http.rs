//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::CompanyNotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict (request is well-formed but clashes with the order's state)
            Self::InvalidTransition
            | Self::OrderNotDeletable
            | Self::ReviewNotAllowed
            | Self::ReviewAlreadySubmitted => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated | Self::TokenExpired | Self::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }

            // 403 Forbidden
            Self::PermissionDenied | Self::RoleRequired => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request
            Self::ValidationFailed
            | Self::ValueOutOfRange
            | Self::ConfirmedDateRequired
            | Self::ConfirmedDateNotPreferred
            | Self::InvalidPreferredDates => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(
            ErrorCode::OrderNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::CompanyNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TokenInvalid.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::PermissionDenied.http_status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_state_conflicts() {
        assert_eq!(
            ErrorCode::InvalidTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::OrderNotDeletable.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_bad_request_status() {
        assert_eq!(
            ErrorCode::ConfirmedDateNotPreferred.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::ValidationFailed.http_status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_error_status() {
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
