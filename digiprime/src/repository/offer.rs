use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use model::domain::offer::Offer;
use model::OfferId;

/// Read access to the offers managed by the marketplace. Soft-deleted
/// offers are returned as is, filtering them is up to the caller.
#[async_trait]
pub trait OfferRepository: Debug + Sync + Send {
    async fn get(&self, id: &OfferId) -> Option<Offer>;

    /// Offers matching any of the `ids`, unknown ids are skipped and
    /// duplicates only show once.
    async fn get_many(&self, ids: &[OfferId]) -> Vec<Offer>;
}

#[derive(Debug)]
pub struct OfferRepositoryHashMapImpl {
    offers: HashMap<OfferId, Offer>,
}

impl OfferRepositoryHashMapImpl {
    pub fn new(offers: Vec<Offer>) -> Self {
        Self {
            offers: offers
                .into_iter()
                .map(|offer| (offer.id.clone(), offer))
                .collect(),
        }
    }
}

#[async_trait]
impl OfferRepository for OfferRepositoryHashMapImpl {
    async fn get(&self, id: &OfferId) -> Option<Offer> {
        trace!("get offer {}", id);
        self.offers.get(id).cloned()
    }

    async fn get_many(&self, ids: &[OfferId]) -> Vec<Offer> {
        trace!("get offers {:?}", ids);
        let mut found: Vec<Offer> = ids
            .iter()
            .filter_map(|id| self.offers.get(id))
            .cloned()
            .collect();
        found.sort_by(|lhs, rhs| lhs.id.cmp(&rhs.id));
        found.dedup_by(|lhs, rhs| lhs.id == rhs.id);
        found
    }
}
