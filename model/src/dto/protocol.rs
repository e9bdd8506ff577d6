//! The string conventions of the Negotiation Engine. Every place where a
//! value is cut out of free text lives here, so a change of the upstream
//! wording only touches this file.
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::InvalidObjectId;

/// Precedes the identifier of a freshly created room or negotiation, e.g.
/// `The room auction #1 has been created id: 61e7f7e20daf6671113c4941`.
pub const CREATED_ID_MARKER: &str = "id: ";
pub const BUYER_SIGNATURE_MARKER: &str = "Buyer signature";
pub const SELLER_SIGNATURE_MARKER: &str = "Seller signature";
/// Only reply of the engine acknowledging a winner.
pub const WINNER_SELECTED: &str = "winner has been selected";

const ENGINE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("The marker {marker:?} is missing from {text:?}")]
    MissingMarker { marker: &'static str, text: String },
    #[error("The engine returned a malformed identifier: {0}")]
    Identifier(#[from] InvalidObjectId),
    #[error("Cannot parse {0:?} as a date")]
    Time(String),
    #[error("The engine returned an empty {0} field")]
    EmptyField(&'static str),
}

/// Extract the identifier following the last [CREATED_ID_MARKER]; the room
/// name quoted earlier in the message may contain the marker too.
pub fn parse_created_id<T>(message: &str) -> Result<T, Error>
where
    T: std::str::FromStr<Err = InvalidObjectId>,
{
    let (_, rest) = message.rsplit_once(CREATED_ID_MARKER).ok_or_else(|| {
        Error::MissingMarker {
            marker: CREATED_ID_MARKER,
            text:   message.to_string(),
        }
    })?;
    let raw = rest.split_whitespace().next().unwrap_or_default();
    Ok(raw.parse::<T>()?)
}

/// The contract of an ended auction, split into its body and the two
/// signature blocks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetails {
    pub text:             String,
    pub buyer_signature:  String,
    pub seller_signature: String,
}

impl ContractDetails {
    /// The body mentions the winning offer by its id only; the first
    /// mention is replaced by `<title> (<id>)`.
    pub fn parse(
        contract: &str,
        offer_id: &str,
        offer_title: &str,
    ) -> Result<Self, Error> {
        let missing = |marker| Error::MissingMarker {
            marker,
            text: contract.to_string(),
        };
        let (body, signatures) = contract
            .split_once(BUYER_SIGNATURE_MARKER)
            .ok_or_else(|| missing(BUYER_SIGNATURE_MARKER))?;
        let (buyer_signature, seller_signature) = signatures
            .split_once(SELLER_SIGNATURE_MARKER)
            .ok_or_else(|| missing(SELLER_SIGNATURE_MARKER))?;

        let text = if offer_id.is_empty() {
            body.to_string()
        } else {
            body.replacen(
                offer_id,
                &format!("{} ({})", offer_title, offer_id),
                1,
            )
        };

        Ok(ContractDetails {
            text,
            buyer_signature: buyer_signature.to_string(),
            seller_signature: seller_signature.to_string(),
        })
    }
}

/// The engine wants `YYYY-MM-DDTHH:MM:SS` in UTC, without fractional
/// seconds nor offset.
pub fn to_engine_time(time: &DateTime<Utc>) -> String {
    time.format(ENGINE_TIME_FORMAT).to_string()
}

/// Timestamps without offset are UTC. Fractional seconds are ignored.
pub fn parse_engine_time(raw: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Ok(time.with_timezone(&Utc));
    }

    let trimmed = raw.trim();
    let trimmed = trimmed.split('.').next().unwrap_or(trimmed);
    NaiveDateTime::parse_from_str(trimmed, ENGINE_TIME_FORMAT)
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| Error::Time(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuctionId;
    use yare::parameterized;

    #[test]
    fn test_parse_created_id() {
        let id: AuctionId = parse_created_id(
            "The room auction #1 has been created id: 61e7f7e20daf6671113c4941",
        )
        .unwrap();
        assert_eq!(id.as_str(), "61e7f7e20daf6671113c4941");
    }

    #[test]
    fn test_parse_created_id_with_marker_in_title() {
        let id: AuctionId = parse_created_id(
            "The room Squid: fresh cells, id: 4 has been created id: \
             61e7f7e20daf6671113c4941",
        )
        .unwrap();
        assert_eq!(id.as_str(), "61e7f7e20daf6671113c4941");
    }

    #[test]
    fn test_parse_created_id_without_marker() {
        let err = parse_created_id::<AuctionId>("The room has been created")
            .unwrap_err();
        assert!(matches!(err, Error::MissingMarker { .. }));
    }

    #[test]
    fn test_parse_created_id_malformed() {
        let err = parse_created_id::<AuctionId>("created id: 42").unwrap_err();
        assert!(matches!(err, Error::Identifier(_)));
        let err = parse_created_id::<AuctionId>("created id: ").unwrap_err();
        assert!(matches!(err, Error::Identifier(_)));
    }

    const CONTRACT: &str = "The buyer acquires 61e7f7e20daf6671113c4941 \
                            from the seller.\nBuyer signature: carol\nSeller \
                            signature: alice";

    #[test]
    fn test_contract_details() {
        let details = ContractDetails::parse(
            CONTRACT,
            "61e7f7e20daf6671113c4941",
            "Used batteries",
        )
        .unwrap();
        assert_eq!(
            details.text,
            "The buyer acquires Used batteries (61e7f7e20daf6671113c4941) \
             from the seller.\n"
        );
        assert_eq!(details.buyer_signature, ": carol\n");
        assert_eq!(details.seller_signature, ": alice");
    }

    #[test]
    fn test_contract_details_offer_not_mentioned() {
        let details =
            ContractDetails::parse(CONTRACT, "61e7f7e20daf6671113c4949", "x")
                .unwrap();
        assert_eq!(
            details.text,
            "The buyer acquires 61e7f7e20daf6671113c4941 from the seller.\n"
        );
    }

    #[parameterized(
        no_buyer = {"Seller signature: alice"},
        no_seller = {"text Buyer signature: carol"},
        reversed = {"text Seller signature: alice Buyer signature: carol"}
    )]
    fn test_contract_details_missing_marker(contract: &str) {
        let err = ContractDetails::parse(contract, "id", "title").unwrap_err();
        assert!(matches!(err, Error::MissingMarker { .. }));
    }

    #[parameterized(
        naive = {"2022-01-19T15:42:25"},
        fractional = {"2022-01-19T15:42:25.373"},
        rfc3339 = {"2022-01-19T15:42:25Z"},
        offset = {"2022-01-19T16:42:25+01:00"},
        space = {"2022-01-19 15:42:25"}
    )]
    fn test_parse_engine_time(raw: &str) {
        assert_eq!(
            parse_engine_time(raw).unwrap(),
            Utc.with_ymd_and_hms(2022, 1, 19, 15, 42, 25).unwrap()
        );
    }

    #[test]
    fn test_parse_engine_time_garbage() {
        assert_eq!(
            parse_engine_time("tomorrow"),
            Err(Error::Time("tomorrow".to_string()))
        );
    }

    #[test]
    fn test_to_engine_time() {
        let time = Utc.with_ymd_and_hms(2022, 1, 19, 15, 42, 25).unwrap()
            + chrono::Duration::milliseconds(373);
        assert_eq!(to_engine_time(&time), "2022-01-19T15:42:25");
    }
}
