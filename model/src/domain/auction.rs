use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use super::offer::Costumer;
use crate::{parse_id_list, AuctionId, InvalidObjectId, OfferId};

/// Bidding direction of an auction. Ascending favors the highest bidder,
/// descending the lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionType {
    Ascending,
    Descending,
}

impl AuctionType {
    /// The owner puts their own offer up for auction: buyers outbid each
    /// other on a supply, sellers underbid each other on a demand.
    pub fn for_owned_offer(costumer: Costumer) -> Self {
        match costumer {
            Costumer::Supply => AuctionType::Ascending,
            Costumer::Demand => AuctionType::Descending,
        }
    }

    /// A searcher makes the offers of other users compete against each
    /// other, which inverts the mapping of [AuctionType::for_owned_offer].
    pub fn for_offer_set(costumer: Costumer) -> Self {
        match costumer {
            Costumer::Supply => AuctionType::Descending,
            Costumer::Demand => AuctionType::Ascending,
        }
    }
}

impl fmt::Display for AuctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuctionType::Ascending => write!(f, "Ascending"),
            AuctionType::Descending => write!(f, "Descending"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Privacy {
    #[serde(alias = "private")]
    Private,
    #[serde(alias = "public")]
    Public,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Private => write!(f, "Private"),
            Privacy::Public => write!(f, "Public"),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub sender: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub amount: f64,
}

/// Local view of an auction owned by the Negotiation Engine. `closed` and
/// `ended` are derived at fetch time and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auction {
    pub id:             Option<AuctionId>,
    pub title:          String,
    pub created_by:     String,
    pub highest_bidder: Option<String>,
    /// Comma-joined offer ids.
    pub articleno:      String,
    pub auction_type:   Option<AuctionType>,
    pub privacy:        Option<Privacy>,
    pub closing_time:   DateTime<Utc>,
    /// The closing time is reached.
    pub closed:         bool,
    /// The buyer has signed, i.e., a winner has been selected.
    pub ended:          bool,
    pub bids:           Vec<Bid>,
    pub members:        Vec<String>,
}

impl Auction {
    /// An auction is historical once it is closed and either has a winner
    /// or never got a bid. Closed auctions with bids but no winner yet stay
    /// active.
    pub fn is_active(&self) -> bool {
        !self.closed || (!self.ended && !self.bids.is_empty())
    }

    pub fn is_member(&self, username: &str) -> bool {
        self.created_by == username
            || self.members.iter().any(|member| member == username)
    }

    pub fn is_highest_bidder(&self, username: &str) -> bool {
        self.highest_bidder.as_deref() == Some(username)
    }

    pub fn offer_ids(&self) -> Result<Vec<OfferId>, InvalidObjectId> {
        parse_id_list(&self.articleno)
    }

    /// Latest bid placed by `username`, the engine appends bids in order.
    pub fn latest_bid_of(&self, username: &str) -> Option<&Bid> {
        self.bids.iter().rev().find(|bid| bid.sender == username)
    }
}

/// Sort by descending closing time and split into (active, history).
pub fn split_active(
    mut auctions: Vec<Auction>,
) -> (Vec<Auction>, Vec<Auction>) {
    sort_by_closing_time(&mut auctions);
    auctions.into_iter().partition(Auction::is_active)
}

pub fn sort_by_closing_time(auctions: &mut [Auction]) {
    auctions.sort_by(|lhs, rhs| rhs.closing_time.cmp(&lhs.closing_time));
}
