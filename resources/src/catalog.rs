//! Resource and transaction-type catalogs.
//!
//! A [`Catalog`] is immutable reference data: the capacity dimensions a block
//! has ([`Resource`]) and the transaction archetypes that consume them
//! ([`TransactionType`]). Cross references are checked once, when the catalog
//! is built, so that the packing code never has to deal with a dangling
//! resource id.

use {
    crate::error::{ResourceError, Result},
    log::debug,
    serde::{Deserialize, Serialize},
    std::{
        collections::{BTreeMap, HashMap},
        fmt,
    },
};

/// Key of a [`Resource`] in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Key of a [`TransactionType`] in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionTypeId(String);

impl TransactionTypeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionTypeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Compute,
    Storage,
    Network,
    Memory,
    State,
}

/// One capacity dimension of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    /// Display unit of `max_throughput`, e.g. `"gas"` or `"KB"`.
    pub unit: String,
    /// Capacity of this resource in a single block. Must be positive.
    pub max_throughput: f64,
    pub category: ResourceCategory,
}

/// A transaction archetype and what one instance of it consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionType {
    pub id: TransactionTypeId,
    pub name: String,
    /// Per-instance consumption. A resource with no entry is not consumed.
    #[serde(default)]
    pub resource_consumption: BTreeMap<ResourceId, f64>,
    /// Gas charged per instance, used for fee estimates.
    pub average_gas: u64,
    /// Relative block-to-block swing in demand for this archetype (0–1).
    #[serde(default)]
    pub demand_volatility: f64,
    /// Sensitivity of demand for this archetype to the base fee (0–1).
    #[serde(default)]
    pub price_elasticity: f64,
}

/// Serialized shape of a catalog before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CatalogSource {
    #[serde(default)]
    resources: Vec<Resource>,
    #[serde(default)]
    transaction_types: Vec<TransactionType>,
}

/// Validated, ordered collection of resources and transaction types.
///
/// Resource order is significant: it is the tie-break order for bottleneck
/// detection and the scan order of admission control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    resources: Vec<Resource>,
    transaction_types: Vec<TransactionType>,
    #[serde(skip)]
    resource_index: HashMap<ResourceId, usize>,
    #[serde(skip)]
    transaction_index: HashMap<TransactionTypeId, usize>,
    /// Dense consumption vectors, one per transaction type, aligned with
    /// `resources`.
    #[serde(skip)]
    consumption: Vec<Vec<f64>>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids, non-positive capacities,
    /// invalid consumption values and references to undefined resources.
    pub fn new(resources: Vec<Resource>, transaction_types: Vec<TransactionType>) -> Result<Self> {
        let mut seen_resources = HashMap::with_capacity(resources.len());
        for (index, resource) in resources.iter().enumerate() {
            if !(resource.max_throughput.is_finite() && resource.max_throughput > 0.0) {
                return Err(ResourceError::InvalidThroughput {
                    resource: resource.id.clone(),
                    max_throughput: resource.max_throughput,
                });
            }
            if seen_resources.insert(&resource.id, index).is_some() {
                return Err(ResourceError::DuplicateResource(resource.id.clone()));
            }
        }

        let mut seen_types = HashMap::with_capacity(transaction_types.len());
        for (index, tx_type) in transaction_types.iter().enumerate() {
            if seen_types.insert(&tx_type.id, index).is_some() {
                return Err(ResourceError::DuplicateTransactionType(tx_type.id.clone()));
            }
            for (resource, &amount) in &tx_type.resource_consumption {
                if !seen_resources.contains_key(resource) {
                    return Err(ResourceError::UnknownResource {
                        transaction_type: tx_type.id.clone(),
                        resource: resource.clone(),
                    });
                }
                if !(amount.is_finite() && amount >= 0.0) {
                    return Err(ResourceError::InvalidConsumption {
                        transaction_type: tx_type.id.clone(),
                        resource: resource.clone(),
                        amount,
                    });
                }
            }
        }

        debug!(
            "catalog built with {} resources and {} transaction types",
            resources.len(),
            transaction_types.len()
        );
        Ok(Self::index(resources, transaction_types))
    }

    /// Parse and validate a catalog from TOML.
    ///
    /// ```toml
    /// [[resources]]
    /// id = "compute"
    /// name = "Compute"
    /// unit = "gas"
    /// max_throughput = 30000000
    /// category = "compute"
    ///
    /// [[transaction_types]]
    /// id = "transfer"
    /// name = "Transfer"
    /// average_gas = 21000
    /// resource_consumption = { compute = 21000 }
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let source: CatalogSource =
            toml::from_str(source).map_err(|err| ResourceError::Parse(err.to_string()))?;
        Self::new(source.resources, source.transaction_types)
    }

    /// Render the catalog back to TOML in the format accepted by
    /// [`Catalog::from_toml_str`].
    pub fn to_toml_string(&self) -> Result<String> {
        let source = CatalogSource {
            resources: self.resources.clone(),
            transaction_types: self.transaction_types.clone(),
        };
        toml::to_string(&source).map_err(|err| ResourceError::Serialize(err.to_string()))
    }

    /// Built-in reference catalog: five block resources and five common
    /// transaction archetypes.
    pub fn reference() -> Self {
        Self::index(reference_resources(), reference_transaction_types())
    }

    fn index(resources: Vec<Resource>, transaction_types: Vec<TransactionType>) -> Self {
        let resource_index: HashMap<ResourceId, usize> = resources
            .iter()
            .enumerate()
            .map(|(index, resource)| (resource.id.clone(), index))
            .collect();
        let transaction_index = transaction_types
            .iter()
            .enumerate()
            .map(|(index, tx_type)| (tx_type.id.clone(), index))
            .collect();
        let consumption = transaction_types
            .iter()
            .map(|tx_type| {
                let mut dense = vec![0.0; resources.len()];
                for (resource, &amount) in &tx_type.resource_consumption {
                    if let Some(&index) = resource_index.get(resource) {
                        dense[index] = amount;
                    }
                }
                dense
            })
            .collect();
        Self {
            resources,
            transaction_types,
            resource_index,
            transaction_index,
            consumption,
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn transaction_types(&self) -> &[TransactionType] {
        &self.transaction_types
    }

    pub fn resource(&self, id: &ResourceId) -> Option<&Resource> {
        self.resource_position(id).map(|index| &self.resources[index])
    }

    /// Position of a resource in catalog order.
    pub fn resource_position(&self, id: &ResourceId) -> Option<usize> {
        self.resource_index.get(id).copied()
    }

    pub fn transaction_type(&self, id: &TransactionTypeId) -> Option<&TransactionType> {
        self.transaction_index
            .get(id)
            .map(|&index| &self.transaction_types[index])
    }

    /// Per-instance consumption of a transaction type, aligned with
    /// [`Catalog::resources`]. Unlisted resources read as zero.
    pub fn consumption_of(&self, id: &TransactionTypeId) -> Option<&[f64]> {
        self.transaction_index
            .get(id)
            .map(|&index| self.consumption[index].as_slice())
    }

    pub(crate) fn require_consumption(&self, id: &TransactionTypeId) -> Result<&[f64]> {
        self.consumption_of(id)
            .ok_or_else(|| ResourceError::UnknownTransactionType(id.clone()))
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let source = CatalogSource::deserialize(deserializer)?;
        Self::new(source.resources, source.transaction_types).map_err(serde::de::Error::custom)
    }
}

fn resource(id: &str, name: &str, unit: &str, max_throughput: f64, category: ResourceCategory) -> Resource {
    Resource {
        id: ResourceId::new(id),
        name: name.to_string(),
        unit: unit.to_string(),
        max_throughput,
        category,
    }
}

fn transaction_type(
    id: &str,
    name: &str,
    average_gas: u64,
    demand_volatility: f64,
    price_elasticity: f64,
    consumption: &[(&str, f64)],
) -> TransactionType {
    TransactionType {
        id: TransactionTypeId::new(id),
        name: name.to_string(),
        resource_consumption: consumption
            .iter()
            .map(|&(resource, amount)| (ResourceId::new(resource), amount))
            .collect(),
        average_gas,
        demand_volatility,
        price_elasticity,
    }
}

fn reference_resources() -> Vec<Resource> {
    vec![
        resource("compute", "Compute", "gas", 30_000_000.0, ResourceCategory::Compute),
        resource("storage_io", "Storage I/O", "ops", 10_000.0, ResourceCategory::Storage),
        resource("bandwidth", "Network Bandwidth", "KB", 2_048.0, ResourceCategory::Network),
        resource("memory", "Memory", "MB", 512.0, ResourceCategory::Memory),
        resource("state_growth", "State Growth", "bytes", 1_000_000.0, ResourceCategory::State),
    ]
}

fn reference_transaction_types() -> Vec<TransactionType> {
    vec![
        transaction_type(
            "transfer",
            "Simple Transfer",
            21_000,
            0.1,
            0.8,
            &[("compute", 21_000.0), ("storage_io", 2.0), ("bandwidth", 0.2)],
        ),
        transaction_type(
            "token_swap",
            "Token Swap",
            150_000,
            0.4,
            0.5,
            &[
                ("compute", 150_000.0),
                ("storage_io", 12.0),
                ("bandwidth", 0.6),
                ("memory", 0.5),
                ("state_growth", 64.0),
            ],
        ),
        transaction_type(
            "nft_mint",
            "NFT Mint",
            120_000,
            0.9,
            0.3,
            &[
                ("compute", 120_000.0),
                ("storage_io", 8.0),
                ("bandwidth", 1.5),
                ("memory", 0.25),
                ("state_growth", 1_200.0),
            ],
        ),
        transaction_type(
            "oracle_update",
            "Oracle Update",
            60_000,
            0.05,
            0.1,
            &[
                ("compute", 60_000.0),
                ("storage_io", 4.0),
                ("bandwidth", 0.4),
                ("state_growth", 32.0),
            ],
        ),
        transaction_type(
            "contract_deploy",
            "Contract Deployment",
            1_500_000,
            0.2,
            0.6,
            &[
                ("compute", 1_500_000.0),
                ("storage_io", 40.0),
                ("bandwidth", 24.0),
                ("memory", 16.0),
                ("state_growth", 24_576.0),
            ],
        ),
    ]
}
