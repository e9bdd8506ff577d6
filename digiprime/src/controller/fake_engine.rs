//! In-memory stand-in for the Negotiation Engine.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;

use model::domain::auction::{sort_by_closing_time, Auction, Bid, Privacy};
use model::domain::negotiation::{LiveNegotiation, NegotiationDetails};
use model::domain::offer::{
    Costumer, Offer, ReferenceSector, ReferenceType, User,
};
use model::dto::engine::{CreateNegotiation, CreateRoom, Signup};
use model::dto::protocol::{ContractDetails, WINNER_SELECTED};
use model::{AuctionId, NegotiationId, OfferId};

use crate::repository::negotiation_engine::{Error, NegotiationEngine};
use crate::repository::offer::OfferRepositoryHashMapImpl;
use crate::repository::user::UserRepositoryHashMapImpl;
use crate::service::eligibility::Eligibility;

pub const A: &str = "61e7f7e20daf6671113c4941";
pub const B: &str = "61e7f7e20daf6671113c4942";
/// Id handed out for every created auction or negotiation.
pub const AUCTION: &str = "61e7f7e20daf6671113c49a0";

pub fn offer(id: &str, author: &str, costumer: Costumer) -> Offer {
    Offer {
        id: id.parse().unwrap(),
        title: format!("offer of {}", author),
        author: author.to_string(),
        reference_sector: ReferenceSector::Batteries,
        reference_type: ReferenceType::Material,
        costumer,
        price: Some(10.0),
        deleted: false,
    }
}

/// Users alice, bob and carol own the given offers.
pub fn eligibility(offers: Vec<Offer>) -> Eligibility {
    let users = ["alice", "bob", "carol"]
        .iter()
        .map(|username| User {
            username: username.to_string(),
            email:    format!("{}@digiprime.eu", username),
        })
        .collect();
    Eligibility::new(
        Arc::new(OfferRepositoryHashMapImpl::new(offers)),
        Arc::new(UserRepositoryHashMapImpl::new(users)),
    )
}

/// A private auction created by carol, closing `closing_in` from now.
pub fn auction(articleno: &str, closing_in: Duration) -> Auction {
    Auction {
        id:             Some(AUCTION.parse().unwrap()),
        title:          "Cells".to_string(),
        created_by:     "carol".to_string(),
        highest_bidder: None,
        articleno:      articleno.to_string(),
        auction_type:   None,
        privacy:        Some(Privacy::Private),
        closing_time:   Utc::now() + closing_in,
        closed:         closing_in <= Duration::zero(),
        ended:          false,
        bids:           Vec::new(),
        members:        Vec::new(),
    }
}

#[derive(Debug)]
pub struct FakeEngine {
    auctions:     Mutex<BTreeMap<AuctionId, Auction>>,
    rooms:        Mutex<Vec<CreateRoom>>,
    winner_reply: Mutex<String>,
    negotiations: Mutex<BTreeMap<NegotiationId, NegotiationDetails>>,
    created:      Mutex<Vec<CreateNegotiation>>,
    /// Winner selections and negotiation actions, as `(username, action)`.
    actions:      Mutex<Vec<(String, String)>>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self {
            auctions:     Mutex::default(),
            rooms:        Mutex::default(),
            winner_reply: Mutex::new(WINNER_SELECTED.to_string()),
            negotiations: Mutex::default(),
            created:      Mutex::default(),
            actions:      Mutex::default(),
        }
    }
}

impl FakeEngine {
    pub fn insert(&self, auction: Auction) {
        let id = auction.id.clone().unwrap();
        self.auctions.lock().unwrap().insert(id, auction);
    }

    pub fn insert_negotiation(&self, negotiation: LiveNegotiation) {
        self.negotiations.lock().unwrap().insert(
            negotiation.id.clone(),
            NegotiationDetails::Live(negotiation),
        );
    }

    pub fn set_winner_reply(&self, reply: &str) {
        *self.winner_reply.lock().unwrap() = reply.to_string();
    }

    pub fn created_rooms(&self) -> Vec<CreateRoom> {
        self.rooms.lock().unwrap().clone()
    }

    pub fn created_negotiations(&self) -> Vec<CreateNegotiation> {
        self.created.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<(String, String)> {
        self.actions.lock().unwrap().clone()
    }

    fn with_auction<T>(
        &self,
        id: &AuctionId,
        f: impl FnOnce(&mut Auction) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut auctions = self.auctions.lock().unwrap();
        let auction = auctions
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("No room {}", id)))?;
        f(auction)
    }

    fn act(&self, username: &str, id: &NegotiationId, action: &str) -> Result<(), Error> {
        if !self.negotiations.lock().unwrap().contains_key(id) {
            return Err(Error::NotFound(format!("No negotiation {}", id)));
        }
        self.actions
            .lock()
            .unwrap()
            .push((username.to_string(), action.to_string()));
        Ok(())
    }
}

#[async_trait]
impl NegotiationEngine for FakeEngine {
    async fn create_auction(
        &self,
        _username: &str,
        room: &CreateRoom,
    ) -> Result<AuctionId, Error> {
        self.rooms.lock().unwrap().push(room.clone());
        Ok(AUCTION.parse().unwrap())
    }

    async fn get_auction(
        &self,
        _username: &str,
        id: &AuctionId,
    ) -> Result<Auction, Error> {
        self.with_auction(id, |auction| Ok(auction.clone()))
    }

    async fn get_auctions(&self, _username: &str) -> Result<Vec<Auction>, Error> {
        let mut auctions: Vec<Auction> =
            self.auctions.lock().unwrap().values().cloned().collect();
        sort_by_closing_time(&mut auctions);
        Ok(auctions)
    }

    async fn get_public_auctions(
        &self,
        username: &str,
    ) -> Result<Vec<Auction>, Error> {
        Ok(self
            .get_auctions(username)
            .await?
            .into_iter()
            .filter(|auction| auction.privacy == Some(Privacy::Public))
            .collect())
    }

    async fn place_bid(
        &self,
        username: &str,
        id: &AuctionId,
        amount: f64,
    ) -> Result<(), Error> {
        self.with_auction(id, |auction| {
            auction.bids.push(Bid { sender: username.to_string(), amount });
            Ok(())
        })
    }

    async fn select_winner(
        &self,
        username: &str,
        id: &AuctionId,
        winner: &str,
    ) -> Result<(), Error> {
        self.with_auction(id, |_| Ok(()))?;
        self.actions
            .lock()
            .unwrap()
            .push((username.to_string(), format!("winner {}", winner)));
        let reply = self.winner_reply.lock().unwrap().clone();
        if reply != WINNER_SELECTED {
            return Err(Error::WinnerNotSelected(reply));
        }
        Ok(())
    }

    async fn get_winner(
        &self,
        _username: &str,
        id: &AuctionId,
        offer_id: &OfferId,
        offer_title: &str,
    ) -> Result<ContractDetails, Error> {
        self.with_auction(id, |_| Ok(()))?;
        let contract = format!(
            "{} changes hands. Buyer signature: buyer Seller signature: seller",
            offer_id
        );
        Ok(ContractDetails::parse(&contract, offer_id.as_str(), offer_title)?)
    }

    async fn get_bids(
        &self,
        _username: &str,
        id: &AuctionId,
    ) -> Result<Vec<Bid>, Error> {
        self.with_auction(id, |auction| Ok(auction.bids.clone()))
    }

    async fn join_auction(
        &self,
        username: &str,
        id: &AuctionId,
    ) -> Result<(), Error> {
        self.with_auction(id, |auction| {
            if auction.is_member(username) {
                return Err(Error::Rejected {
                    status:  StatusCode::BAD_REQUEST,
                    message: "already a member".to_string(),
                });
            }
            auction.members.push(username.to_string());
            Ok(())
        })
    }

    async fn create_negotiation(
        &self,
        _username: &str,
        negotiation: &CreateNegotiation,
    ) -> Result<NegotiationId, Error> {
        self.created.lock().unwrap().push(negotiation.clone());
        Ok(AUCTION.parse().unwrap())
    }

    async fn get_negotiation(
        &self,
        _username: &str,
        id: &NegotiationId,
    ) -> Result<NegotiationDetails, Error> {
        self.negotiations
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("No negotiation {}", id)))
    }

    async fn list_negotiations(
        &self,
        _username: &str,
    ) -> Result<Vec<LiveNegotiation>, Error> {
        Ok(self
            .negotiations
            .lock()
            .unwrap()
            .values()
            .filter_map(|details| match details {
                NegotiationDetails::Live(live) => Some(live.clone()),
                NegotiationDetails::Contract(_) => None,
            })
            .collect())
    }

    async fn negotiation_bid(
        &self,
        username: &str,
        id: &NegotiationId,
        amount: f64,
    ) -> Result<(), Error> {
        self.act(username, id, &format!("bid {}", amount))
    }

    async fn negotiation_accept(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error> {
        self.act(username, id, "accept")
    }

    async fn negotiation_cancel(
        &self,
        username: &str,
        id: &NegotiationId,
    ) -> Result<(), Error> {
        self.act(username, id, "cancel")
    }

    async fn contract_templates(&self) -> Result<Vec<String>, Error> {
        Ok(vec!["default".to_string(), "batteries".to_string()])
    }

    async fn signup(&self, _signup: &Signup) -> Result<(), Error> { Ok(()) }
}
