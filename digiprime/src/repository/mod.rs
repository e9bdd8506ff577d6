pub(crate) mod negotiation_engine;
pub(crate) mod offer;
pub(crate) mod seed;
pub(crate) mod user;
