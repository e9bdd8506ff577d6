use chrono::{DateTime, Utc};

use model::domain::auction::{Auction, Bid, Privacy};
use model::domain::offer::Offer;
use model::domain::pagination::{Page, PerPage};
use model::dto::engine::CreateRoom;
use model::dto::protocol;
use model::view::auction::{
    AuctionCreated, CreateAuctionPage, CreateAuctionRequest, CreatePageQuery,
    OfferWithBid, PlaceBid, SelectWinner, ShowAuction,
};
use model::{AuctionId, OfferId};

use super::{check_bid, check_not_blank, check_positive, page_of, ControllerError};
use crate::repository::negotiation_engine::NegotiationEngine;
use crate::repository::offer::OfferRepository;
use crate::service::eligibility::Eligibility;

pub async fn list_active(
    username: &str,
    raw_page: Option<&str>,
    per_page: PerPage,
    engine: &dyn NegotiationEngine,
) -> Result<Page<Auction>, ControllerError> {
    trace!("list active auctions of {}", username);
    let auctions = engine.get_active_auctions(username).await?;
    Ok(page_of(&auctions, raw_page, per_page))
}

pub async fn list_history(
    username: &str,
    raw_page: Option<&str>,
    per_page: PerPage,
    engine: &dyn NegotiationEngine,
) -> Result<Page<Auction>, ControllerError> {
    trace!("list auction history of {}", username);
    let auctions = engine.get_auction_history(username).await?;
    Ok(page_of(&auctions, raw_page, per_page))
}

pub async fn list_public(
    username: &str,
    raw_page: Option<&str>,
    per_page: PerPage,
    engine: &dyn NegotiationEngine,
) -> Result<Page<Auction>, ControllerError> {
    trace!("list public auctions for {}", username);
    let auctions = engine.get_public_auctions(username).await?;
    Ok(page_of(&auctions, raw_page, per_page))
}

/// Everything needed to fill the create form, checked up front so the
/// user does not fill it for nothing.
pub async fn create_page(
    username: &str,
    query: CreatePageQuery,
    eligibility: &Eligibility,
) -> Result<CreateAuctionPage, ControllerError> {
    trace!("create page for {}: {:?}", username, query);
    match query {
        CreatePageQuery::Offer { offer_id } => {
            let auction = eligibility
                .validate_single_offer_auction(username, &offer_id)
                .await?;
            Ok(CreateAuctionPage::Offer {
                offer:        auction.offer,
                auction_type: auction.auction_type,
                users:        eligibility.other_usernames(username).await,
            })
        }
        CreatePageQuery::Search { offer_ids } => {
            let offer_ids = CreatePageQuery::search_ids(&offer_ids)?;
            let auction = eligibility
                .validate_multi_offer_auction(username, &offer_ids)
                .await?;
            Ok(CreateAuctionPage::Search {
                offers:           auction.offers,
                reference_sector: auction.reference_sector,
                reference_type:   auction.reference_type,
                auction_type:     auction.auction_type,
            })
        }
    }
}

pub async fn create(
    username: &str,
    request: CreateAuctionRequest,
    now: DateTime<Utc>,
    eligibility: &Eligibility,
    engine: &dyn NegotiationEngine,
) -> Result<AuctionCreated, ControllerError> {
    trace!("create auction for {}: {:?}", username, request);
    let title = check_not_blank("auctionTitle", request.auction_title())?
        .to_string();
    let quantity = check_positive("quantity", request.quantity())?;
    let closing_time = *request.closing_time();
    if closing_time <= now {
        return Err(ControllerError::InvalidInput(
            "closingTime must be in the future".to_string(),
        ));
    }

    let room = match request {
        CreateAuctionRequest::SingleOffer(request) => {
            let auction = eligibility
                .validate_single_offer_auction(username, &request.offer_id)
                .await?;
            let members = eligibility
                .validate_members(username, request.members.into())
                .await?;
            CreateRoom::new(
                title,
                auction.auction_type,
                &closing_time,
                auction.offer.reference_sector,
                auction.offer.reference_type,
                quantity,
                &members,
                auction.offer.id.to_string(),
                request.privacy,
            )
        }
        CreateAuctionRequest::OfferSet(request) => {
            let auction = eligibility
                .validate_multi_offer_auction(username, &request.offer_ids)
                .await?;
            CreateRoom::new(
                title,
                auction.auction_type,
                &closing_time,
                auction.reference_sector,
                auction.reference_type,
                quantity,
                &auction.members(),
                auction.articleno(),
                Privacy::Private,
            )
        }
    };

    let id = engine.create_auction(username, &room).await?;
    info!("{} created the auction {}", username, id);
    Ok(AuctionCreated { id })
}

/// The creator and the winner of an ended auction see the contract, anyone
/// else sees the offers with the bid of their author.
pub async fn show(
    username: &str,
    id: &AuctionId,
    engine: &dyn NegotiationEngine,
    offers: &dyn OfferRepository,
) -> Result<ShowAuction, ControllerError> {
    trace!("show auction {} to {}", id, username);
    let auction = engine.get_auction(username, id).await?;
    let offer_ids =
        auction.offer_ids().map_err(protocol::Error::Identifier)?;
    let auction_offers = ordered_offers(&offer_ids, offers).await;

    let may_see_contract =
        auction.created_by == username || auction.is_highest_bidder(username);
    if auction.ended && may_see_contract {
        let offer = winning_offer(&auction, auction_offers)?;
        let contract = engine
            .get_winner(username, id, &offer.id, &offer.title)
            .await?;
        return Ok(ShowAuction::Ended { auction, contract, offer });
    }

    let offers = auction_offers
        .into_iter()
        .map(|offer| OfferWithBid {
            bid: auction.latest_bid_of(&offer.author).cloned(),
            offer,
        })
        .collect();
    Ok(ShowAuction::Live { auction, offers })
}

async fn ordered_offers(
    ids: &[OfferId],
    offers: &dyn OfferRepository,
) -> Vec<Offer> {
    let mut found = offers.get_many(ids).await;
    found.sort_by_key(|offer| ids.iter().position(|id| *id == offer.id));
    found
}

/// An auction over several offers is won by the author of one of them.
fn winning_offer(
    auction: &Auction,
    mut offers: Vec<Offer>,
) -> Result<Offer, ControllerError> {
    let position = if offers.len() > 1 {
        offers.iter().position(|offer| {
            auction.is_highest_bidder(&offer.author)
        })
    } else if offers.is_empty() {
        None
    } else {
        Some(0)
    };

    position.map(|position| offers.swap_remove(position)).ok_or_else(|| {
        ControllerError::NotFound(format!(
            "The winning offer of the auction {} is gone",
            auction.title
        ))
    })
}

pub async fn place_bid(
    username: &str,
    id: &AuctionId,
    bid: PlaceBid,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} bids {} on {}", username, bid.bid, id);
    let amount = check_bid(bid.bid)?;
    engine.place_bid(username, id, amount).await?;
    Ok(())
}

pub async fn select_winner(
    username: &str,
    id: &AuctionId,
    winner: SelectWinner,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} selects {} as winner of {}", username, winner.winner, id);
    let winner = check_not_blank("winner", &winner.winner)?;
    engine.select_winner(username, id, winner).await?;
    info!("{} won the auction {}", winner, id);
    Ok(())
}

pub async fn get_bids(
    username: &str,
    id: &AuctionId,
    engine: &dyn NegotiationEngine,
) -> Result<Vec<Bid>, ControllerError> {
    trace!("get bids of {}", id);
    Ok(engine.get_bids(username, id).await?)
}

/// Only public auctions can be joined, and only once.
pub async fn join(
    username: &str,
    id: &AuctionId,
    engine: &dyn NegotiationEngine,
) -> Result<(), ControllerError> {
    trace!("{} joins {}", username, id);
    let auction = engine.get_auction(username, id).await?;
    if auction.privacy != Some(Privacy::Public) {
        return Err(ControllerError::Forbidden(
            "Only public auctions can be joined".to_string(),
        ));
    }
    if auction.is_member(username) {
        return Err(ControllerError::InvalidInput(
            "You are already a member of this auction".to_string(),
        ));
    }
    engine.join_auction(username, id).await?;
    Ok(())
}
