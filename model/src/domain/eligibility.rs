//! Rules deciding whether a set of offers and members can form an auction.
//!
//! Every check stops at the first violated invariant; there is no partial
//! result and no aggregation of several errors.
use std::collections::{HashMap, HashSet};

use super::auction::AuctionType;
use super::offer::{Costumer, Offer, ReferenceSector, ReferenceType};
use crate::OfferId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    NotFound,
    Forbidden,
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Offer {0} not found")]
    OfferNotFound(OfferId),
    #[error("Cannot create auction from other user's offer")]
    NotOfferOwner,
    #[error("An auction over several offers needs at least 2 of them, got {0}")]
    TooFewOffers(usize),
    #[error("Some or all offer IDs are invalid")]
    UnknownOffers,
    #[error("All offers must share the same {0}")]
    Heterogeneous(&'static str),
    #[error("Offers must come from distinct users, {0} authored several")]
    DuplicateAuthor(String),
    #[error("Cannot create an auction containing your own offer")]
    OwnOfferInSet,
    #[error("Cannot add the creator as a member")]
    CreatorIsMember,
    #[error("Could not find all passed members among the registered users")]
    UnknownMembers,
    #[error("Cannot create a negotiation with yourself")]
    SelfNegotiation,
}

impl Error {
    pub fn kind(&self) -> Kind {
        match self {
            Error::OfferNotFound(_) => Kind::NotFound,
            Error::NotOfferOwner => Kind::Forbidden,
            _ => Kind::InvalidInput,
        }
    }
}

/// Auction over an offer of the creator.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleOfferAuction {
    pub offer:        Offer,
    pub auction_type: AuctionType,
}

/// Auction making the offers of other users compete.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSetAuction {
    /// In the order the ids were requested.
    pub offers:           Vec<Offer>,
    pub reference_sector: ReferenceSector,
    pub reference_type:   ReferenceType,
    pub costumer:         Costumer,
    pub auction_type:     AuctionType,
}

impl OfferSetAuction {
    /// Every offer contributes its author as a member.
    pub fn members(&self) -> Vec<String> {
        self.offers.iter().map(|offer| offer.author.clone()).collect()
    }

    pub fn articleno(&self) -> String {
        self.offers
            .iter()
            .map(|offer| offer.id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// `offer` is the result of the lookup of `offer_id`.
pub fn check_single_offer(
    creator: &str,
    offer_id: &OfferId,
    offer: Option<Offer>,
) -> Result<SingleOfferAuction, Error> {
    let offer = offer
        .filter(|offer| !offer.deleted)
        .ok_or_else(|| Error::OfferNotFound(offer_id.clone()))?;

    if offer.author != creator {
        return Err(Error::NotOfferOwner);
    }

    let auction_type = AuctionType::for_owned_offer(offer.costumer);
    Ok(SingleOfferAuction { offer, auction_type })
}

/// `found` is the result of the lookup of all the `requested` ids, in any
/// order.
pub fn check_offer_set(
    creator: &str,
    requested: &[OfferId],
    found: Vec<Offer>,
) -> Result<OfferSetAuction, Error> {
    if requested.len() < 2 {
        return Err(Error::TooFewOffers(requested.len()));
    }

    let mut by_id: HashMap<OfferId, Offer> = found
        .into_iter()
        .filter(|offer| !offer.deleted)
        .map(|offer| (offer.id.clone(), offer))
        .collect();
    if by_id.len() != requested.len() {
        return Err(Error::UnknownOffers);
    }
    // A duplicated id is only found once
    let offers = requested
        .iter()
        .map(|id| by_id.remove(id).ok_or(Error::UnknownOffers))
        .collect::<Result<Vec<_>, _>>()?;

    let reference = &offers[0];
    let (reference_sector, reference_type, costumer) = (
        reference.reference_sector,
        reference.reference_type,
        reference.costumer,
    );

    offers.iter().try_fold(HashSet::new(), |mut authors, offer| {
        if offer.reference_sector != reference_sector {
            return Err(Error::Heterogeneous("reference sector"));
        }
        if offer.reference_type != reference_type {
            return Err(Error::Heterogeneous("reference type"));
        }
        if offer.costumer != costumer {
            return Err(Error::Heterogeneous("supply or demand"));
        }
        if offer.author == creator {
            return Err(Error::OwnOfferInSet);
        }
        if !authors.insert(offer.author.as_str()) {
            return Err(Error::DuplicateAuthor(offer.author.clone()));
        }
        Ok(authors)
    })?;

    Ok(OfferSetAuction {
        auction_type: AuctionType::for_offer_set(costumer),
        offers,
        reference_sector,
        reference_type,
        costumer,
    })
}

/// `registered` holds the usernames that resolved to a known user; it may
/// contain more than the members.
pub fn check_members(
    creator: &str,
    members: Vec<String>,
    registered: &HashSet<String>,
) -> Result<Vec<String>, Error> {
    if members.iter().any(|member| member == creator) {
        return Err(Error::CreatorIsMember);
    }

    let resolved = members
        .iter()
        .filter(|member| registered.contains(member.as_str()))
        .collect::<HashSet<_>>();
    if resolved.len() < members.len() {
        return Err(Error::UnknownMembers);
    }

    Ok(members)
}

/// The other party of a negotiation is the author of the offer, which
/// cannot be the requester.
pub fn check_negotiation_offer(
    requester: &str,
    offer_id: &OfferId,
    offer: Option<Offer>,
) -> Result<Offer, Error> {
    let offer = offer
        .filter(|offer| !offer.deleted)
        .ok_or_else(|| Error::OfferNotFound(offer_id.clone()))?;

    if offer.author == requester {
        return Err(Error::SelfNegotiation);
    }
    Ok(offer)
}
