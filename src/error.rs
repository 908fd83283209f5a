// region:    --- Imports
use crate::listing::model::{ListingId, UserId};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Bid Rejection
/// 입찰 거절 사유
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BidRejection {
    #[error("You cannot place a bid on a closed listing.")]
    ListingClosed,
    #[error(
        "Bid must be greater than the starting bid and greater than any other bids that have been placed."
    )]
    BidTooLow,
}

impl BidRejection {
    pub fn code(self) -> &'static str {
        match self {
            BidRejection::ListingClosed => "LISTING_CLOSED",
            BidRejection::BidTooLow => "BID_TOO_LOW",
        }
    }
}
// endregion: --- Bid Rejection

// region:    --- Error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    BidRejected(#[from] BidRejection),

    #[error("Listing {0} does not exist.")]
    ListingNotFound(ListingId),

    #[error("User {0} does not exist.")]
    UserNotFound(UserId),

    #[error("Username already taken.")]
    UsernameTaken(String),

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("You must be logged in to do that.")]
    Unauthenticated,

    #[error("Only the owner can close this listing.")]
    NotListingOwner,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::BidRejected(rejection) => rejection.code(),
            Error::ListingNotFound(_) => "LISTING_NOT_FOUND",
            Error::UserNotFound(_) => "USER_NOT_FOUND",
            Error::UsernameTaken(_) => "USERNAME_TAKEN",
            Error::InvalidInput { .. } => "INVALID_INPUT",
            Error::Unauthenticated => "UNAUTHENTICATED",
            Error::NotListingOwner => "NOT_LISTING_OWNER",
            Error::Database(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::BidRejected(_) | Error::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            Error::ListingNotFound(_) => StatusCode::NOT_FOUND,
            Error::UserNotFound(_) | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::UsernameTaken(_) => StatusCode::CONFLICT,
            Error::NotListingOwner => StatusCode::FORBIDDEN,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = match &self {
            Error::Database(e) => {
                error!("{:<12} --> 데이터베이스 오류: {:?}", "Error", e);
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };
        (
            self.status(),
            Json(serde_json::json!({
                "error": message,
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
// endregion: --- Error
