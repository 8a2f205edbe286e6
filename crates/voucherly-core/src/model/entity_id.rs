use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Voucher or guest identifier as the controller issued it.
///
/// UUIDs come from the Integration API, 24-hex-digit ObjectIds from the
/// legacy API. Anything that parses as a UUID is treated as one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    ObjectId(String),
}

impl EntityId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        if let Self::Uuid(uuid) = self {
            Some(uuid)
        } else {
            None
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(uuid) => uuid.fmt(f),
            Self::ObjectId(raw) => f.write_str(raw),
        }
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self::Uuid(uuid)
    }
}

impl From<String> for EntityId {
    fn from(raw: String) -> Self {
        Uuid::parse_str(&raw).map_or(Self::ObjectId(raw), Self::Uuid)
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(raw.into())
    }
}
