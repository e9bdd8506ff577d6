use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::NegotiationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NegotiationStatus {
    Submitted,
    Offer,
    CounterOffer,
    Accepted,
    Rejected,
}

impl NegotiationStatus {
    pub fn is_finished(self) -> bool {
        matches!(self, NegotiationStatus::Accepted | NegotiationStatus::Rejected)
    }
}

/// A negotiation still going back and forth between the two parties.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveNegotiation {
    #[serde(alias = "_id")]
    pub id:            NegotiationId,
    #[serde(default)]
    pub title:         Option<String>,
    pub status:        NegotiationStatus,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub current_offer: f64,
    /// The party that made the current offer.
    pub offer_user:    String,
    pub seller:        String,
    pub articleno:     String,
    #[serde(default)]
    pub quantity:      Option<f64>,
}

impl LiveNegotiation {
    /// The party that has to answer the current offer.
    pub fn awaits_answer_from(&self, username: &str) -> bool {
        !self.status.is_finished() && self.offer_user != username
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedContract {
    pub contract: String,
}

/// The engine answers with either the signed contract or the live state of
/// the negotiation from the same endpoint; the presence of the `contract`
/// field tells them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NegotiationDetails {
    Contract(FinishedContract),
    Live(LiveNegotiation),
}
