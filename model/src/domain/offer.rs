use std::fmt;

use serde::{Deserialize, Serialize};

use crate::OfferId;

/// Whether the author sells (supply) or looks for (demand) what the offer
/// describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Costumer {
    #[serde(alias = "supply")]
    Supply,
    #[serde(alias = "demand")]
    Demand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceSector {
    #[serde(alias = "composites")]
    Composites,
    #[serde(alias = "batteries")]
    Batteries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceType {
    #[serde(alias = "material")]
    Material,
    #[serde(alias = "product")]
    Product,
}

impl fmt::Display for Costumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Costumer::Supply => write!(f, "Supply"),
            Costumer::Demand => write!(f, "Demand"),
        }
    }
}

impl fmt::Display for ReferenceSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceSector::Composites => write!(f, "Composites"),
            ReferenceSector::Batteries => write!(f, "Batteries"),
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceType::Material => write!(f, "Material"),
            ReferenceType::Product => write!(f, "Product"),
        }
    }
}

/// A supply or demand listing. Offers are soft-deleted, a `deleted` offer
/// must be treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id:               OfferId,
    pub title:            String,
    /// Username of the owner.
    pub author:           String,
    pub reference_sector: ReferenceSector,
    pub reference_type:   ReferenceType,
    pub costumer:         Costumer,
    #[serde(default)]
    pub price:            Option<f64>,
    #[serde(default)]
    pub deleted:          bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email:    String,
}
