use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::domain::auction::{Auction, AuctionType, Bid, Privacy};
use crate::domain::offer::{Offer, ReferenceSector, ReferenceType};
use crate::dto::protocol::ContractDetails;
use crate::{parse_id_list, AuctionId, InvalidObjectId, OfferId};

/// Usernames of the members, a single one may be sent as a plain string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Members {
    One(String),
    Many(Vec<String>),
}

impl From<Members> for Vec<String> {
    fn from(members: Members) -> Self {
        match members {
            Members::One(member) => vec![member],
            Members::Many(members) => members,
        }
    }
}

/// The owner puts one of their offers up for auction and picks the
/// members.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSingleOfferAuction {
    pub auction_title: String,
    pub closing_time:  DateTime<Utc>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub quantity:      f64,
    pub offer_id:      OfferId,
    pub members:       Members,
    pub privacy:       Privacy,
}

/// A searcher makes several offers of other users compete.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateOfferSetAuction {
    pub auction_title: String,
    pub closing_time:  DateTime<Utc>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub quantity:      f64,
    pub offer_ids:     Vec<OfferId>,
}

/// Body of `POST /auctions`, the shape decides the path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CreateAuctionRequest {
    SingleOffer(CreateSingleOfferAuction),
    OfferSet(CreateOfferSetAuction),
}

impl CreateAuctionRequest {
    pub fn auction_title(&self) -> &str {
        match self {
            CreateAuctionRequest::SingleOffer(req) => &req.auction_title,
            CreateAuctionRequest::OfferSet(req) => &req.auction_title,
        }
    }

    pub fn closing_time(&self) -> &DateTime<Utc> {
        match self {
            CreateAuctionRequest::SingleOffer(req) => &req.closing_time,
            CreateAuctionRequest::OfferSet(req) => &req.closing_time,
        }
    }

    pub fn quantity(&self) -> f64 {
        match self {
            CreateAuctionRequest::SingleOffer(req) => req.quantity,
            CreateAuctionRequest::OfferSet(req) => req.quantity,
        }
    }
}

/// Query of the create page, telling where the user comes from.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "from", rename_all = "lowercase")]
pub enum CreatePageQuery {
    /// Comma-separated ids picked on the search page.
    Search {
        #[serde(rename = "offerIds")]
        offer_ids: String,
    },
    Offer {
        #[serde(rename = "offerId")]
        offer_id: OfferId,
    },
}

impl CreatePageQuery {
    pub fn search_ids(raw: &str) -> Result<Vec<OfferId>, InvalidObjectId> {
        parse_id_list(raw)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "from", rename_all = "lowercase")]
pub enum CreateAuctionPage {
    Offer {
        offer:        Offer,
        #[serde(rename = "auctionType")]
        auction_type: AuctionType,
        /// Everyone but the requester.
        users:        Vec<String>,
    },
    Search {
        offers:           Vec<Offer>,
        #[serde(rename = "referenceSector")]
        reference_sector: ReferenceSector,
        #[serde(rename = "referenceType")]
        reference_type:   ReferenceType,
        #[serde(rename = "auctionType")]
        auction_type:     AuctionType,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionCreated {
    pub id: AuctionId,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceBid {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub bid: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectWinner {
    pub winner: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<String>,
}

/// An offer of a live auction with the latest bid of its author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferWithBid {
    pub offer: Offer,
    pub bid:   Option<Bid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum ShowAuction {
    /// Only the creator and the winner get to see the contract.
    Ended {
        auction:  Auction,
        contract: ContractDetails,
        offer:    Offer,
    },
    Live {
        auction: Auction,
        offers:  Vec<OfferWithBid>,
    },
}
