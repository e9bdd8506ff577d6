pub mod auction;
pub mod eligibility;
pub mod negotiation;
pub mod offer;
pub mod pagination;
