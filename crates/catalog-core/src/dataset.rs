//! Catalog output entities: datasets, offers and distributions

use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::asset::{Asset, AssetId};
use crate::error::OfferIdError;
use crate::policy::Policy;

/// Endpoint through which the datasets of a catalog can be negotiated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataService {
    pub id: String,
    pub endpoint_url: String,
}

impl DataService {
    pub fn new(id: impl Into<String>, endpoint_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            endpoint_url: endpoint_url.into(),
        }
    }
}

/// How a dataset can be obtained
///
/// One distribution is supplied per resolution call and attached to every
/// dataset of that call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    pub format: String,
    pub data_service: DataService,
}

impl Distribution {
    pub fn new(format: impl Into<String>, data_service: DataService) -> Self {
        Self {
            format: format.into(),
            data_service,
        }
    }
}

/// Identifier of a contract offer: `definition:asset:nonce`, each segment base64 encoded
///
/// The nonce is derived from the definition, asset and policy ids, so the same
/// offer is identified identically across catalog requests until one of them
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractOfferId {
    definition_id: String,
    asset_id: AssetId,
    nonce: String,
}

impl ContractOfferId {
    /// Derive the offer id for `asset_id` offered by a definition under `policy_id`
    pub fn derive(definition_id: impl Into<String>, asset_id: AssetId, policy_id: &str) -> Self {
        let definition_id = definition_id.into();
        let name = format!("{}\u{1f}{}\u{1f}{}", definition_id, asset_id, policy_id);
        Self {
            definition_id,
            asset_id,
            nonce: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string(),
        }
    }

    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn nonce(&self) -> &str {
        &self.nonce
    }
}

impl Display for ContractOfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            STANDARD.encode(&self.definition_id),
            STANDARD.encode(self.asset_id.as_str()),
            STANDARD.encode(&self.nonce)
        )
    }
}

impl FromStr for ContractOfferId {
    type Err = OfferIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s.split(':').collect();
        if segments.len() != 3 {
            return Err(OfferIdError::SegmentCount(segments.len()));
        }

        let decode = |segment: &str| -> Result<String, OfferIdError> {
            let bytes = STANDARD
                .decode(segment)
                .map_err(|e| OfferIdError::Encoding(e.to_string()))?;
            String::from_utf8(bytes).map_err(|_| OfferIdError::Utf8)
        };

        Ok(Self {
            definition_id: decode(segments[0])?,
            asset_id: AssetId::new(decode(segments[1])?),
            nonce: decode(segments[2])?,
        })
    }
}

impl TryFrom<String> for ContractOfferId {
    type Error = OfferIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContractOfferId> for String {
    fn from(id: ContractOfferId) -> Self {
        id.to_string()
    }
}

/// A policy offered for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractOffer {
    pub id: ContractOfferId,
    pub policy: Policy,
}

/// An externally visible catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: AssetId,
    pub properties: BTreeMap<String, Value>,
    pub offer: ContractOffer,
    pub distribution: Distribution,
}

impl Dataset {
    /// Build the dataset for `asset`; the offer's policy is expected to target it
    pub fn new(asset: Asset, offer: ContractOffer, distribution: Distribution) -> Self {
        Self {
            id: asset.id,
            properties: asset.properties,
            offer,
            distribution,
        }
    }
}
