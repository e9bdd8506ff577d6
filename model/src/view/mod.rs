pub mod auction;
pub mod negotiation;
