//! Addresses that locate a flaw inside nested geometries.
//!
//! A flaw on a top-level geometry is addressed by its index. A flaw inside a
//! Multi-geometry or GeometryCollection is addressed by the container's index
//! together with the addresses of the flawed members, e.g. `{3: [1, 2]}` for the
//! second and third member of the fourth geometry. Addresses compose to any
//! depth: `{0: [{1: [1, 2]}]}` points into a MultiPolygon held by a
//! GeometryCollection.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexAddress {
    /// The geometry at this index is flawed itself
    Leaf(usize),
    /// Members of the container at this index are flawed
    Nested(usize, Vec<IndexAddress>),
}

impl IndexAddress {
    /// The index at this level of the address
    pub fn index(&self) -> usize {
        match self {
            IndexAddress::Leaf(index) | IndexAddress::Nested(index, _) => *index,
        }
    }

    /// Number of container levels above the flawed geometry
    pub fn depth(&self) -> usize {
        match self {
            IndexAddress::Leaf(_) => 0,
            IndexAddress::Nested(_, children) => {
                1 + children.iter().map(IndexAddress::depth).max().unwrap_or(0)
            }
        }
    }
}

impl From<usize> for IndexAddress {
    fn from(index: usize) -> Self {
        IndexAddress::Leaf(index)
    }
}

impl fmt::Display for IndexAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexAddress::Leaf(index) => write!(f, "{}", index),
            IndexAddress::Nested(index, children) => {
                write!(f, "{{{}: [", index)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                f.write_str("]}")
            }
        }
    }
}

impl Serialize for IndexAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IndexAddress::Leaf(index) => serializer.serialize_u64(*index as u64),
            IndexAddress::Nested(index, children) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(&index.to_string(), children)?;
                map.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AddressRepr {
    Leaf(usize),
    Nested(BTreeMap<String, Vec<IndexAddress>>),
}

impl<'de> Deserialize<'de> for IndexAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AddressRepr::deserialize(deserializer)? {
            AddressRepr::Leaf(index) => Ok(IndexAddress::Leaf(index)),
            AddressRepr::Nested(map) => {
                if map.len() != 1 {
                    return Err(de::Error::custom(format!(
                        "nested index address must have exactly one key, found {}",
                        map.len()
                    )));
                }
                let (key, children) = map.into_iter().next().ok_or_else(|| {
                    de::Error::custom("nested index address must have exactly one key")
                })?;
                let index = key.parse::<usize>().map_err(|_| {
                    de::Error::custom(format!("nested index address key '{}' is not an index", key))
                })?;
                Ok(IndexAddress::Nested(index, children))
            }
        }
    }
}
