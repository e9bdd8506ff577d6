use std::path::Path;

use serde::Deserialize;

use model::domain::offer::{Offer, User};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot read the seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse the seed file: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Local users and offers, loaded once at start-up from a RON document.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
    #[serde(default)]
    pub users:  Vec<User>,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

impl Seed {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, Error> { Ok(ron::from_str(raw)?) }
}
