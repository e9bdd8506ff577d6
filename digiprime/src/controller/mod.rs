use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use model::domain::eligibility::{self, Kind};
use model::domain::pagination::{paginate, parse_page, Page, PerPage};
use model::dto::protocol;
use model::InvalidObjectId;

use crate::repository::negotiation_engine;

#[derive(thiserror::Error, Debug)]
pub enum ControllerError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidInput(String),
    /// The engine refused the request, the message is meant for the user.
    #[error("{message}")]
    UpstreamDomain { status: u16, message: String },
    #[error("The negotiation engine could not serve the request: {0}")]
    UpstreamTransport(negotiation_engine::Error),
}

impl From<eligibility::Error> for ControllerError {
    fn from(err: eligibility::Error) -> Self {
        let message = err.to_string();
        match err.kind() {
            Kind::NotFound => ControllerError::NotFound(message),
            Kind::Forbidden => ControllerError::Forbidden(message),
            Kind::InvalidInput => ControllerError::InvalidInput(message),
        }
    }
}

impl From<InvalidObjectId> for ControllerError {
    fn from(err: InvalidObjectId) -> Self {
        ControllerError::InvalidInput(err.to_string())
    }
}

impl From<negotiation_engine::Error> for ControllerError {
    fn from(err: negotiation_engine::Error) -> Self {
        use negotiation_engine::Error;
        match err {
            Error::NotFound(message) => ControllerError::NotFound(message),
            Error::Rejected { status, message } => {
                ControllerError::UpstreamDomain {
                    status: status.as_u16(),
                    message,
                }
            }
            Error::WinnerNotSelected(message) => {
                ControllerError::UpstreamDomain {
                    status: StatusCode::BAD_REQUEST.as_u16(),
                    message,
                }
            }
            err => ControllerError::UpstreamTransport(err),
        }
    }
}

/// The engine handed back data this service cannot make sense of.
impl From<protocol::Error> for ControllerError {
    fn from(err: protocol::Error) -> Self {
        ControllerError::UpstreamTransport(err.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for ControllerError {
    fn status_code(&self) -> StatusCode {
        match self {
            ControllerError::NotFound(_) => StatusCode::NOT_FOUND,
            ControllerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ControllerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ControllerError::UpstreamDomain { status, .. } => {
                StatusCode::from_u16(*status)
                    .unwrap_or(StatusCode::BAD_REQUEST)
            }
            ControllerError::UpstreamTransport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            ControllerError::UpstreamTransport(err) => {
                error!("{:?}", err);
                "The negotiation engine is unavailable, try again later"
                    .to_string()
            }
            err => err.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error })
    }
}

/// Bids of auctions and negotiations start at 1.
pub(crate) fn check_bid(bid: f64) -> Result<f64, ControllerError> {
    if bid.is_finite() && bid >= 1.0 {
        Ok(bid)
    } else {
        Err(ControllerError::InvalidInput(format!(
            "The bid must be at least 1, got {}",
            bid
        )))
    }
}

pub(crate) fn check_positive(
    name: &str,
    value: f64,
) -> Result<f64, ControllerError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ControllerError::InvalidInput(format!(
            "{} must be a positive number",
            name
        )))
    }
}

pub(crate) fn check_not_blank<'a>(
    name: &str,
    value: &'a str,
) -> Result<&'a str, ControllerError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ControllerError::InvalidInput(format!(
            "{} must not be empty",
            name
        )));
    }
    Ok(value)
}

/// Page of `items`, remembering the raw page query for the page links.
pub(crate) fn page_of<T: Clone>(
    items: &[T],
    raw_page: Option<&str>,
    per_page: PerPage,
) -> Page<T> {
    let mut page = paginate(items, parse_page(raw_page), per_page);
    if let Some(raw) = raw_page {
        page.query.insert("page".to_string(), raw.to_string());
    }
    page
}

pub(crate) mod auction;
pub(crate) mod negotiation;
pub(crate) mod user;

#[cfg(test)]
pub(crate) mod fake_engine;
