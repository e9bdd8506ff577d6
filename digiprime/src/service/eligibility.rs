use std::sync::Arc;

use model::domain::eligibility::{
    check_members, check_negotiation_offer, check_offer_set,
    check_single_offer, Error, OfferSetAuction, SingleOfferAuction,
};
use model::domain::offer::Offer;
use model::OfferId;

use crate::repository::offer::OfferRepository;
use crate::repository::user::UserRepository;

/// Run the auction and negotiation rules against the local stores.
#[derive(Debug)]
pub struct Eligibility {
    offers: Arc<dyn OfferRepository>,
    users:  Arc<dyn UserRepository>,
}

impl Eligibility {
    pub fn new(
        offers: Arc<dyn OfferRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self { offers, users }
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn validate_single_offer_auction(
        &self,
        creator: &str,
        offer_id: &OfferId,
    ) -> Result<SingleOfferAuction, Error> {
        let offer = self.offers.get(offer_id).await;
        check_single_offer(creator, offer_id, offer)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn validate_multi_offer_auction(
        &self,
        creator: &str,
        offer_ids: &[OfferId],
    ) -> Result<OfferSetAuction, Error> {
        if offer_ids.len() < 2 {
            return Err(Error::TooFewOffers(offer_ids.len()));
        }
        let found = self.offers.get_many(offer_ids).await;
        check_offer_set(creator, offer_ids, found)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn validate_members(
        &self,
        creator: &str,
        members: Vec<String>,
    ) -> Result<Vec<String>, Error> {
        let registered = self.users.find_usernames(&members).await;
        check_members(creator, members, &registered)
    }

    #[instrument(level = "trace", skip(self))]
    pub async fn validate_negotiation_offer(
        &self,
        requester: &str,
        offer_id: &OfferId,
    ) -> Result<Offer, Error> {
        let offer = self.offers.get(offer_id).await;
        check_negotiation_offer(requester, offer_id, offer)
    }

    /// Candidate members of an auction created by `creator`.
    pub async fn other_usernames(&self, creator: &str) -> Vec<String> {
        self.users
            .usernames()
            .await
            .into_iter()
            .filter(|username| username != creator)
            .collect()
    }
}
