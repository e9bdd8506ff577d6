use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::domain::negotiation::NegotiationDetails;
use crate::domain::offer::Offer;
use crate::NegotiationId;

/// Body of `POST /negotiations/create/{offerId}`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateNegotiationRequest {
    pub title:    String,
    /// Name of one of the engine's contract templates.
    pub contract: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub quantity: f64,
    /// Opening price.
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub price:    f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NegotiationCreatePage {
    pub offer:     Offer,
    pub contracts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationCreated {
    pub id: NegotiationId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowNegotiation {
    pub negotiation: NegotiationDetails,
    /// The requester is the one expected to accept, counter or cancel.
    pub can_answer:  bool,
}
