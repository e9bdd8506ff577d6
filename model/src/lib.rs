use core::str::FromStr;
use std::fmt;

use lazy_regex::regex_is_match;
use serde::de::Visitor;
use serde::{Deserialize, Serialize};

/// The offer store and the Negotiation Engine both hand out 24 hexadecimal
/// characters identifiers. Encapsulate them in custom structs to let the
/// compiler differentiate them.
macro_rules! impl_object_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            id: String,
        }

        impl $name {
            #[inline(always)]
            pub fn as_str(&self) -> &str { &self.id }
        }

        impl FromStr for $name {
            type Err = InvalidObjectId;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_object_id(s) {
                    Ok($name { id: s.to_string() })
                } else {
                    Err(InvalidObjectId(s.to_string()))
                }
            }
        }

        impl fmt::Display for $name {
            #[inline(always)]
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.id)
            }
        }

        impl Serialize for $name {
            #[inline(always)]
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                struct MyVisitor;

                impl<'de> Visitor<'de> for MyVisitor {
                    type Value = $name;

                    fn expecting(
                        &self,
                        formatter: &mut fmt::Formatter,
                    ) -> fmt::Result {
                        formatter.write_str(
                            format!(
                                "a {}, i.e., 24 hexadecimal characters",
                                stringify!($name)
                            )
                            .as_str(),
                        )
                    }

                    fn visit_str<E>(
                        self,
                        value: &str,
                    ) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        value.parse::<$name>().map_err(E::custom)
                    }
                }

                deserializer.deserialize_str(MyVisitor)
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a valid identifier")]
pub struct InvalidObjectId(pub String);

fn is_object_id(s: &str) -> bool { regex_is_match!(r"^[0-9a-fA-F]{24}$", s) }

/// Parse a comma-separated list of identifiers, blanks are skipped.
pub fn parse_id_list<T>(raw: &str) -> Result<Vec<T>, InvalidObjectId>
where
    T: FromStr<Err = InvalidObjectId>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::parse)
        .collect()
}

impl_object_id!(OfferId);
impl_object_id!(AuctionId);
impl_object_id!(NegotiationId);

pub mod domain;
pub mod dto;
pub mod view;
