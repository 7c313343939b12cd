//! Fuzz block packing with random catalogs and admission sequences.
//!
//! Goals:
//! - Find panics in catalog validation and the packing functions.
//! - Verify that an admitted block never exceeds any resource capacity.
//! - Verify that a rejected add leaves the batch untouched.
//! - Verify that removal never leaves a zero-count entry behind.

#![no_main]

use {
    arbitrary::{Arbitrary, Unstructured},
    blockspace_resources::{
        packing::{compute_usage, find_bottleneck, max_admissible, remove_count, try_add, utilization_breakdown},
        Batch, Catalog, Resource, ResourceCategory, ResourceId, TransactionType, TransactionTypeId,
    },
    libfuzzer_sys::fuzz_target,
    std::collections::BTreeMap,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Add { type_index: u8, count: u16 },
    Remove { type_index: u8, count: u16 },
    Fill { type_index: u8 },
}

#[derive(Debug)]
struct FuzzInput {
    capacities: Vec<f64>,
    consumption: Vec<Vec<f64>>,
    ops: Vec<Op>,
}

impl<'a> Arbitrary<'a> for FuzzInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let resources = u.int_in_range(1..=6)?;
        let types = u.int_in_range(1..=6)?;
        let capacities = (0..resources)
            .map(|_| u.arbitrary())
            .collect::<arbitrary::Result<_>>()?;
        let consumption = (0..types)
            .map(|_| (0..resources).map(|_| u.arbitrary()).collect())
            .collect::<arbitrary::Result<_>>()?;
        Ok(FuzzInput {
            capacities,
            consumption,
            ops: u.arbitrary()?,
        })
    }
}

fn build_catalog(input: &FuzzInput) -> Option<Catalog> {
    let resources = input
        .capacities
        .iter()
        .enumerate()
        .map(|(i, &max_throughput)| Resource {
            id: ResourceId::new(format!("r{i}")),
            name: format!("Resource {i}"),
            unit: "unit".to_string(),
            max_throughput,
            category: ResourceCategory::Compute,
        })
        .collect();
    let transaction_types = input
        .consumption
        .iter()
        .enumerate()
        .map(|(i, amounts)| TransactionType {
            id: TransactionTypeId::new(format!("t{i}")),
            name: format!("Type {i}"),
            resource_consumption: amounts
                .iter()
                .enumerate()
                .map(|(r, &amount)| (ResourceId::new(format!("r{r}")), amount))
                .collect::<BTreeMap<_, _>>(),
            average_gas: 21_000,
            demand_volatility: 0.0,
            price_elasticity: 0.0,
        })
        .collect();
    // Invalid catalogs are rejected, never panic.
    Catalog::new(resources, transaction_types).ok()
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let input: FuzzInput = match u.arbitrary() {
        Ok(i) => i,
        Err(_) => return,
    };
    let Some(catalog) = build_catalog(&input) else {
        return;
    };
    let ids: Vec<TransactionTypeId> = catalog
        .transaction_types()
        .iter()
        .map(|tx_type| tx_type.id.clone())
        .collect();

    let mut batch = Batch::new();
    for op in input.ops.iter().take(256) {
        match *op {
            Op::Add { type_index, count } => {
                let id = &ids[type_index as usize % ids.len()];
                let Ok(outcome) = try_add(&batch, id, u64::from(count), &catalog) else {
                    // Only a zero count is refused.
                    assert_eq!(count, 0);
                    continue;
                };
                if !outcome.admitted {
                    assert_eq!(outcome.batch, batch, "rejected add changed the batch");
                    assert!(outcome.blocked_by.is_some());
                }
                batch = outcome.batch;
            }
            Op::Remove { type_index, count } => {
                let id = &ids[type_index as usize % ids.len()];
                let before = batch.count_of(id);
                batch = remove_count(&batch, id, u64::from(count));
                assert_eq!(batch.count_of(id), before.saturating_sub(u64::from(count)));
            }
            Op::Fill { type_index } => {
                let id = &ids[type_index as usize % ids.len()];
                let fits = max_admissible(&batch, id, &catalog).expect("known type");
                if fits > 0 && fits < u64::from(u32::MAX) {
                    let outcome = try_add(&batch, id, fits, &catalog).expect("non-zero count");
                    assert!(outcome.admitted, "max_admissible({id}) = {fits} was rejected");
                    batch = outcome.batch;
                }
            }
        }

        assert!(batch.entries().iter().all(|entry| entry.count > 0));
        let usage = compute_usage(&batch, &catalog).expect("batch only holds known types");
        for entry in utilization_breakdown(&usage, &catalog) {
            assert!(
                entry.percent <= 100.0,
                "{} overcommitted at {}%",
                entry.resource_id,
                entry.percent
            );
        }
        let bottleneck = find_bottleneck(&usage, &catalog);
        assert!(bottleneck.utilization_percent <= 100.0);
    }
});
