//! Catalog items and the selectors that address them
//!
//! An [`AssetSelector`] is carried through the resolver untouched. Only an
//! [`AssetIndex`](crate::AssetIndex) implementation gives its criteria meaning.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Unique identifier of an asset
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One addressable entry in the asset store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    /// Free-form properties exposed on the catalog entry
    pub properties: BTreeMap<String, Value>,
}

impl Asset {
    /// Property key under which the asset id is addressable by criteria
    pub const PROPERTY_ID: &'static str = "id";

    /// Property key for the human readable name
    pub const PROPERTY_NAME: &'static str = "name";

    pub fn new(id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Builder: set a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Builder: set the name property
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_property(Self::PROPERTY_NAME, name.into())
    }

    /// Look up a property, treating [`Asset::PROPERTY_ID`] as the asset id
    pub fn property(&self, key: &str) -> Option<Value> {
        if key == Self::PROPERTY_ID {
            return Some(Value::String(self.id.0.clone()));
        }
        self.properties.get(key).cloned()
    }
}

/// A single filter clause, e.g. `id in [a, b]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub operand_left: String,
    pub operator: String,
    pub operand_right: Value,
}

impl Criterion {
    pub fn new(
        operand_left: impl Into<String>,
        operator: impl Into<String>,
        operand_right: impl Into<Value>,
    ) -> Self {
        Self {
            operand_left: operand_left.into(),
            operator: operator.into(),
            operand_right: operand_right.into(),
        }
    }
}

/// Selection predicate of a contract definition
///
/// A conjunction of criteria. The empty selector selects every asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetSelector {
    criteria: Vec<Criterion>,
}

impl AssetSelector {
    /// Selector matching every asset in the store
    pub fn select_all() -> Self {
        Self::default()
    }

    pub fn new(criteria: Vec<Criterion>) -> Self {
        Self { criteria }
    }

    /// Selector matching exactly the given asset ids
    pub fn for_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<Value> = ids.into_iter().map(|id| Value::String(id.into())).collect();
        Self::new(vec![Criterion::new(Asset::PROPERTY_ID, "in", ids)])
    }

    /// Builder: add a criterion
    pub fn and(mut self, criterion: Criterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }
}
