use model::domain::negotiation::{LiveNegotiation, NegotiationDetails};
use model::domain::pagination::{Page, PerPage};
use model::dto::engine::CreateNegotiation;
use model::view::auction::PlaceBid;
use model::view::negotiation::{
    CreateNegotiationRequest, NegotiationCreatePage, NegotiationCreated,
    ShowNegotiation,
};
use model::{NegotiationId, OfferId};

use super::{check_bid, check_not_blank, check_positive, page_of, ControllerError};
use crate::repository::negotiation_engine::NegotiationEngine;
use crate::service::eligibility::Eligibility;

/// The offer and the contract templates to pick from.
pub async fn create_page(
    username: &str,
    offer_id: &OfferId,
    eligibility: &Eligibility,
    engine: &dyn NegotiationEngine,
) -> Result<NegotiationCreatePage, ControllerError> {
    trace!("negotiation create page of {} for {}", offer_id, username);
    let (offer, contracts) = futures::join!(
        eligibility.validate_negotiation_offer(username, offer_id),
        engine.contract_templates()
    );
    Ok(NegotiationCreatePage { offer: offer?, contracts: contracts? })
}

pub async fn create(
    username: &str,
    offer_id: &OfferId,
    request: CreateNegotiationRequest,
    eligibility: &Eligibility,
    engine: &dyn NegotiationEngine,
) -> Result<NegotiationCreated, ControllerError> {
    trace!("create negotiation over {} for {}", offer_id, username);
    let title = check_not_blank("title", &request.title)?.to_string();
    let contract = check_not_blank("contract", &request.contract)?.to_string();
    let quantity = check_positive("quantity", request.quantity)?;
    let price = check_positive("price", request.price)?;

    let offer = eligibility
        .validate_negotiation_offer(username, offer_id)
        .await?;
    let negotiation = CreateNegotiation {
        title,
        price,
        seller: offer.author,
        reference_sector: offer.reference_sector,
        reference_type: offer.reference_type,
        quantity,
        articleno: offer.id.to_string(),
        contract,
    };

    let id = engine.create_negotiation(username, &negotiation).await?;
    info!("{} opened the negotiation {}", username, id);
    Ok(NegotiationCreated { id })
}

pub async fn show(
    username: &str,
    id: &NegotiationId,
    engine: &dyn NegotiationEngine,
) -> Result<ShowNegotiation, ControllerError> {
    trace!("show negotiation {} to {}", id, username);
    let negotiation = engine.get_negotiation(username, id).await?;
    let can_answer = match &negotiation {
        NegotiationDetails::Live(live) => live.awaits_answer_from(username),
        NegotiationDetails::Contract(_) => false,
    };
    Ok(ShowNegotiation { negotiation, can_answer })
}

pub async fn list(
    username: &str,
    raw_page: Option<&str>,
    per_page: PerPage,
    engine: &dyn NegotiationEngine,
) -> Result<Page<LiveNegotiation>, ControllerError> {
    trace!("list negotiations of {}", username);
    let negotiations = engine.list_negotiations(username).await?;
    Ok(page_of(&negotiations, raw_page, per_page))
}

/// Counter the current offer.
pub async fn place_bid(
    username: &str,
    id: &NegotiationId,
    bid: PlaceBid,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} counters {} with {}", username, id, bid.bid);
    let amount = check_bid(bid.bid)?;
    engine.negotiation_bid(username, id, amount).await?;
    Ok(())
}

pub async fn accept(
    username: &str,
    id: &NegotiationId,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} accepts {}", username, id);
    engine.negotiation_accept(username, id).await?;
    Ok(())
}

pub async fn cancel(
    username: &str,
    id: &NegotiationId,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} cancels {}", username, id);
    engine.negotiation_cancel(username, id).await?;
    Ok(())
}
