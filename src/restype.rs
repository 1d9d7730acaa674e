use serde::{Deserialize, Serialize};
use std::fmt;

//===========================================================================//

/// The type of resource named in the container header.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Plain images (ICO files, type 1)
    Icon,
    /// Images with cursor hotspots (CUR files, type 2)
    Cursor,
}

impl ResourceType {
    /// Maps the header's type field to a resource type.
    pub fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    /// The value written into the header's type field.
    pub fn number(&self) -> u16 {
        match *self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ResourceType::Icon => write!(f, "{} (ICO)", self.number()),
            ResourceType::Cursor => write!(f, "{} (CUR)", self.number()),
        }
    }
}

//===========================================================================//


//===========================================================================//
