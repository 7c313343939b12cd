//! Block packing and bottleneck resolution.
//!
//! A block has one capacity per catalog resource. A [`Batch`] of added
//! transactions fits in the block when no resource is pushed past its
//! `max_throughput`. Usage is never stored: every query recomputes it from the
//! batch, so it cannot drift from the batch contents.
//!
//! All functions here are pure. Operations that "change" a batch return a new
//! [`Batch`] and leave the input untouched.

use {
    crate::{
        catalog::{Catalog, ResourceId, TransactionTypeId},
        error::{ResourceError, Result},
    },
    log::debug,
    serde::{Deserialize, Serialize},
};

/// `count` instances of one transaction type in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedTransaction {
    pub transaction_type_id: TransactionTypeId,
    pub count: u64,
}

/// Ordered list of added transactions, at most one entry per type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<AddedTransaction>);

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[AddedTransaction] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct transaction types in the batch.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn count_of(&self, id: &TransactionTypeId) -> u64 {
        self.0
            .iter()
            .find(|entry| &entry.transaction_type_id == id)
            .map_or(0, |entry| entry.count)
    }

    /// Total number of transaction instances across all entries.
    pub fn total_count(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |total, entry| total.saturating_add(entry.count))
    }

    fn with_added(&self, id: &TransactionTypeId, count: u64) -> Self {
        let mut entries = self.0.clone();
        match entries
            .iter_mut()
            .find(|entry| &entry.transaction_type_id == id)
        {
            Some(entry) => entry.count = entry.count.saturating_add(count),
            None => entries.push(AddedTransaction {
                transaction_type_id: id.clone(),
                count,
            }),
        }
        Self(entries)
    }
}

/// Accumulated consumption per resource, aligned with catalog order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResourceUsage(Vec<f64>);

impl ResourceUsage {
    pub fn zero(catalog: &Catalog) -> Self {
        Self(vec![0.0; catalog.num_resources()])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Usage of the resource at `position` in catalog order.
    pub fn get(&self, position: usize) -> Option<f64> {
        self.0.get(position).copied()
    }

    pub fn of(&self, catalog: &Catalog, id: &ResourceId) -> Option<f64> {
        catalog
            .resource_position(id)
            .and_then(|position| self.get(position))
    }
}

/// The most utilized resource of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    /// `None` when the batch consumes nothing.
    pub resource_id: Option<ResourceId>,
    pub utilization_percent: f64,
}

/// Result of an admission-control check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceedCheck {
    pub exceeds: bool,
    /// First resource, in catalog order, that would be pushed past capacity.
    pub resource: Option<ResourceId>,
}

/// Outcome of [`try_add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryAddOutcome {
    /// The merged batch when admitted, an unchanged copy otherwise.
    pub batch: Batch,
    pub admitted: bool,
    /// Resource that caused a rejection ("block full").
    pub blocked_by: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceUtilization {
    pub resource_id: ResourceId,
    pub usage: f64,
    pub max_throughput: f64,
    pub percent: f64,
}

/// Sum of `consumption × count` per resource over the batch.
pub fn compute_usage(batch: &Batch, catalog: &Catalog) -> Result<ResourceUsage> {
    let mut usage = ResourceUsage::zero(catalog);
    for entry in batch.entries() {
        let consumption = catalog.require_consumption(&entry.transaction_type_id)?;
        accumulate(&mut usage.0, consumption, entry.count);
    }
    Ok(usage)
}

fn accumulate(usage: &mut [f64], consumption: &[f64], count: u64) {
    let count = count as f64;
    for (amount, per_instance) in usage.iter_mut().zip(consumption) {
        *amount += per_instance * count;
    }
}

fn percent_of(usage: f64, max_throughput: f64) -> f64 {
    usage / max_throughput * 100.0
}

/// Resource with the strictly largest utilization percentage.
///
/// Exact ties go to the resource that comes first in the catalog. A batch that
/// consumes nothing has no bottleneck.
pub fn find_bottleneck(usage: &ResourceUsage, catalog: &Catalog) -> Bottleneck {
    let mut best: Option<(&ResourceId, f64)> = None;
    for (resource, &amount) in catalog.resources().iter().zip(usage.as_slice()) {
        let percent = percent_of(amount, resource.max_throughput);
        if percent > best.map_or(0.0, |(_, best_percent)| best_percent) {
            best = Some((&resource.id, percent));
        }
    }
    match best {
        Some((id, percent)) => Bottleneck {
            resource_id: Some(id.clone()),
            utilization_percent: percent,
        },
        None => Bottleneck {
            resource_id: None,
            utilization_percent: 0.0,
        },
    }
}

/// Per-resource utilization in catalog order.
pub fn utilization_breakdown(usage: &ResourceUsage, catalog: &Catalog) -> Vec<ResourceUtilization> {
    catalog
        .resources()
        .iter()
        .zip(usage.as_slice())
        .map(|(resource, &amount)| ResourceUtilization {
            resource_id: resource.id.clone(),
            usage: amount,
            max_throughput: resource.max_throughput,
            percent: percent_of(amount, resource.max_throughput),
        })
        .collect()
}

/// Capacity left per resource, floored at zero.
pub fn remaining_capacity(usage: &ResourceUsage, catalog: &Catalog) -> ResourceUsage {
    ResourceUsage(
        catalog
            .resources()
            .iter()
            .zip(usage.as_slice())
            .map(|(resource, &amount)| (resource.max_throughput - amount).max(0.0))
            .collect(),
    )
}

/// Would adding `count` instances of `id` push any resource past 100 %?
///
/// Resources are scanned in catalog order and the first offender is reported.
pub fn would_exceed(
    batch: &Batch,
    id: &TransactionTypeId,
    count: u64,
    catalog: &Catalog,
) -> Result<ExceedCheck> {
    if count == 0 {
        return Err(ResourceError::ZeroCount);
    }
    catalog.require_consumption(id)?;
    // Project from the merged batch so the check sees exactly the usage that
    // `compute_usage` will report after admission.
    let projected = compute_usage(&batch.with_added(id, count), catalog)?;
    Ok(first_exceeded(&projected, catalog))
}

fn first_exceeded(projected: &ResourceUsage, catalog: &Catalog) -> ExceedCheck {
    let resource = catalog
        .resources()
        .iter()
        .zip(projected.as_slice())
        .find(|&(resource, &amount)| percent_of(amount, resource.max_throughput) > 100.0)
        .map(|(resource, _)| resource.id.clone());
    ExceedCheck {
        exceeds: resource.is_some(),
        resource,
    }
}

/// Admit `count` instances of `id` into the batch, all or nothing.
///
/// If any resource would exceed its capacity the whole count is rejected and
/// the returned batch equals the input. Otherwise the count is merged into the
/// existing entry for that type, or appended as a new entry.
pub fn try_add(
    batch: &Batch,
    id: &TransactionTypeId,
    count: u64,
    catalog: &Catalog,
) -> Result<TryAddOutcome> {
    let check = would_exceed(batch, id, count, catalog)?;
    if check.exceeds {
        debug!(
            "block full: rejected {} x {} (resource {})",
            count,
            id,
            check.resource.as_ref().map_or("-", ResourceId::as_str)
        );
        return Ok(TryAddOutcome {
            batch: batch.clone(),
            admitted: false,
            blocked_by: check.resource,
        });
    }
    Ok(TryAddOutcome {
        batch: batch.with_added(id, count),
        admitted: true,
        blocked_by: None,
    })
}

/// Remove up to `count` instances of `id`.
///
/// An entry whose count reaches zero is dropped. Removing more than present,
/// or a type that is not in the batch, is not an error.
pub fn remove_count(batch: &Batch, id: &TransactionTypeId, count: u64) -> Batch {
    Batch(
        batch
            .entries()
            .iter()
            .filter_map(|entry| {
                if &entry.transaction_type_id != id {
                    return Some(entry.clone());
                }
                let left = entry.count.saturating_sub(count);
                (left > 0).then(|| AddedTransaction {
                    transaction_type_id: entry.transaction_type_id.clone(),
                    count: left,
                })
            })
            .collect(),
    )
}

/// Largest count of `id` that [`try_add`] would still admit.
///
/// A type that consumes nothing never fills a block; it reports `u64::MAX`
/// unless the batch is already over capacity.
pub fn max_admissible(batch: &Batch, id: &TransactionTypeId, catalog: &Catalog) -> Result<u64> {
    let consumption = catalog.require_consumption(id)?;
    let usage = compute_usage(batch, catalog)?;
    // A batch built against another catalog, or deserialized, may already be
    // over capacity; then nothing fits.
    if first_exceeded(&usage, catalog).exceeds {
        return Ok(0);
    }
    let headroom = remaining_capacity(&usage, catalog);

    let mut estimate = u64::MAX;
    for (&per_instance, &left) in consumption.iter().zip(headroom.as_slice()) {
        if per_instance > 0.0 {
            // `as` saturates, which is what we want for huge ratios.
            estimate = estimate.min((left / per_instance).floor() as u64);
        }
    }
    if estimate == u64::MAX {
        return Ok(estimate);
    }

    // Float division can miss the boundary in either direction, so bracket
    // the estimate and binary search. `admits` is monotone in the count.
    let admits = |count: u64| -> Result<bool> {
        let projected = compute_usage(&batch.with_added(id, count), catalog)?;
        Ok(!first_exceeded(&projected, catalog).exceeds)
    };
    let mut low = 0u64;
    let mut high = estimate.saturating_add(2);
    while admits(high)? {
        if high == u64::MAX {
            return Ok(high);
        }
        low = high;
        high = high.saturating_mul(2);
    }
    // Invariant: `low` is admitted (0 trivially), `high` is not.
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if admits(mid)? {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(low)
}

/// Total gas of the batch: Σ `average_gas × count`.
pub fn batch_gas(batch: &Batch, catalog: &Catalog) -> Result<u64> {
    batch.entries().iter().try_fold(0u64, |total, entry| {
        let tx_type = catalog
            .transaction_type(&entry.transaction_type_id)
            .ok_or_else(|| ResourceError::UnknownTransactionType(entry.transaction_type_id.clone()))?;
        Ok(total.saturating_add(tx_type.average_gas.saturating_mul(entry.count)))
    })
}

/// Fee the batch would pay at `base_fee` per unit of gas.
pub fn estimate_batch_fee(batch: &Batch, catalog: &Catalog, base_fee: f64) -> Result<f64> {
    Ok(batch_gas(batch, catalog)? as f64 * base_fee)
}

/// A caller-owned block under construction.
///
/// Wraps the pure functions above for callers that want to keep one batch and
/// replace it after every admitted change.
#[derive(Debug, Clone)]
pub struct BlockBuilder<'a> {
    catalog: &'a Catalog,
    batch: Batch,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            batch: Batch::new(),
        }
    }

    pub fn with_batch(catalog: &'a Catalog, batch: Batch) -> Self {
        Self { catalog, batch }
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn into_batch(self) -> Batch {
        self.batch
    }

    /// Try to add `count` instances. Returns whether they were admitted.
    pub fn add(&mut self, id: &TransactionTypeId, count: u64) -> Result<bool> {
        let outcome = try_add(&self.batch, id, count, self.catalog)?;
        self.batch = outcome.batch;
        Ok(outcome.admitted)
    }

    pub fn remove(&mut self, id: &TransactionTypeId, count: u64) {
        self.batch = remove_count(&self.batch, id, count);
    }

    pub fn usage(&self) -> Result<ResourceUsage> {
        compute_usage(&self.batch, self.catalog)
    }

    pub fn bottleneck(&self) -> Result<Bottleneck> {
        Ok(find_bottleneck(&self.usage()?, self.catalog))
    }

    pub fn breakdown(&self) -> Result<Vec<ResourceUtilization>> {
        Ok(utilization_breakdown(&self.usage()?, self.catalog))
    }

    /// Utilization of the bottleneck resource as a 0–1 fraction, the scalar
    /// the fee market consumes per block.
    pub fn block_utilization(&self) -> Result<f64> {
        Ok((self.bottleneck()?.utilization_percent / 100.0).clamp(0.0, 1.0))
    }

    pub fn estimated_fee(&self, base_fee: f64) -> Result<f64> {
        estimate_batch_fee(&self.batch, self.catalog, base_fee)
    }
}
