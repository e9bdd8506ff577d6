use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::protocol::{self, parse_engine_time, Error};
use crate::domain::auction::{Auction, AuctionType, Bid, Privacy};
use crate::domain::offer::{ReferenceSector, ReferenceType};
use crate::AuctionId;

/// Room payload values are wrapped as `{"val": [value]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineField<T> {
    #[serde(default = "Vec::new")]
    pub val: Vec<T>,
}

impl<T> Default for EngineField<T> {
    fn default() -> Self { EngineField { val: Vec::new() } }
}

impl<T> EngineField<T> {
    pub fn first(&self) -> Option<&T> { self.val.first() }
}

impl EngineField<String> {
    /// First value, `None` when missing or blank.
    pub fn text(&self) -> Option<&str> {
        self.first().map(String::as_str).filter(|val| !val.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAuctionPayload {
    pub closing_time:   EngineField<String>,
    #[serde(default)]
    pub buyersign:      EngineField<String>,
    #[serde(default)]
    pub articleno:      EngineField<String>,
    #[serde(default)]
    pub highest_bidder: EngineField<String>,
    #[serde(default)]
    pub created_by:     EngineField<String>,
    #[serde(default)]
    pub room_name:      EngineField<String>,
    #[serde(default)]
    pub auction_type:   EngineField<Value>,
    #[serde(default)]
    pub privacy:        EngineField<Value>,
}

/// A room as returned by `/rooms/{id}/info` and the room listings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAuction {
    #[serde(default, alias = "_id")]
    pub id:      Option<AuctionId>,
    pub payload: RawAuctionPayload,
    #[serde(default)]
    pub bids:    Vec<Bid>,
    #[serde(default)]
    pub members: Vec<String>,
}

impl RawAuction {
    /// Derive `closed`, `ended` and the closing time relative to `now`.
    pub fn normalize(self, now: DateTime<Utc>) -> Result<Auction, Error> {
        let payload = self.payload;
        let closing_time = payload
            .closing_time
            .text()
            .ok_or(Error::EmptyField("closing_time"))
            .and_then(parse_engine_time)?;

        Ok(Auction {
            id: self.id,
            title: payload.room_name.text().unwrap_or_default().to_string(),
            created_by: payload
                .created_by
                .text()
                .unwrap_or_default()
                .to_string(),
            highest_bidder: payload.highest_bidder.text().map(str::to_string),
            articleno: payload.articleno.text().unwrap_or_default().to_string(),
            auction_type: payload
                .auction_type
                .first()
                .and_then(|val| AuctionType::deserialize(val).ok()),
            privacy: payload
                .privacy
                .first()
                .and_then(|val| Privacy::deserialize(val).ok()),
            closed: closing_time <= now,
            ended: payload.buyersign.text().is_some(),
            closing_time,
            bids: self.bids,
            members: self.members,
        })
    }
}

/// Acknowledgement of the engine, error bodies use `detail` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMessage {
    #[serde(alias = "detail")]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContractResponse {
    pub contract: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BidsResponse {
    #[serde(rename = "Bids", default)]
    pub bids: Vec<Bid>,
}

/// Form of `POST /create-room`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateRoom {
    pub room_name:        String,
    pub auction_type:     AuctionType,
    /// See [protocol::to_engine_time].
    pub closing_time:     String,
    pub reference_sector: ReferenceSector,
    pub reference_type:   ReferenceType,
    pub quantity:         f64,
    /// Comma-joined usernames.
    pub members:          String,
    /// Comma-joined offer ids.
    pub articleno:        String,
    pub privacy:          Privacy,
}

impl CreateRoom {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        room_name: String,
        auction_type: AuctionType,
        closing_time: &DateTime<Utc>,
        reference_sector: ReferenceSector,
        reference_type: ReferenceType,
        quantity: f64,
        members: &[String],
        articleno: String,
        privacy: Privacy,
    ) -> Self {
        CreateRoom {
            room_name,
            auction_type,
            closing_time: protocol::to_engine_time(closing_time),
            reference_sector,
            reference_type,
            quantity,
            members: members.join(","),
            articleno,
            privacy,
        }
    }
}

/// Form of `POST /negotiate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateNegotiation {
    pub title:            String,
    pub price:            f64,
    /// Author of the offer, the other party of the negotiation.
    pub seller:           String,
    pub reference_sector: ReferenceSector,
    pub reference_type:   ReferenceType,
    pub quantity:         f64,
    pub articleno:        String,
    /// Name of the contract template.
    pub contract:         String,
}

/// Form of the bid endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidForm {
    pub message_input: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinnerForm<'a> {
    pub winner: &'a str,
}

/// Body of `POST /signup`, the shadow account of a local user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signup {
    pub username:    String,
    pub email:       String,
    pub password:    String,
    #[serde(default)]
    pub coordinates: Option<String>,
}
