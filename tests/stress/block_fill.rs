//! Stress Test: Block Filling
//!
//! Packs blocks from the reference catalog under sustained load, checks that
//! no resource is ever overcommitted, and closes the loop by feeding the
//! packed blocks' bottleneck utilization into the fee market.
//!
//! Run: `cargo test --test block_fill -- --nocapture`

use {
    blockspace_fee_market::{
        calculator::calculate_demand_response, simulation::create_initial_state,
        FeeMarketConfig,
    },
    blockspace_resources::{
        packing::{max_admissible, try_add},
        Batch, BlockBuilder, Catalog, TransactionTypeId,
    },
    log::info,
    rand::{rngs::StdRng, Rng, SeedableRng},
    std::time::Instant,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One "round" of a typical transaction mix.
const MIX: [(&str, u64); 4] = [
    ("transfer", 20),
    ("token_swap", 5),
    ("nft_mint", 2),
    ("oracle_update", 3),
];

#[test]
fn stress_random_admission_never_overfills() {
    init_logger();
    println!("\n=== Random Admission Stress Test ===\n");

    let catalog = Catalog::reference();
    let ids: Vec<TransactionTypeId> = catalog
        .transaction_types()
        .iter()
        .map(|tx_type| tx_type.id.clone())
        .collect();
    let mut rng = StdRng::seed_from_u64(7);

    let start = Instant::now();
    let mut admitted = 0u64;
    let mut rejected = 0u64;
    let mut blocks = 0u64;

    for _ in 0..200 {
        let mut builder = BlockBuilder::new(&catalog);
        let mut consecutive_rejections = 0;
        while consecutive_rejections < 20 {
            let id = &ids[rng.random_range(0..ids.len())];
            let count = rng.random_range(1..=50);
            if builder.add(id, count).unwrap() {
                admitted += count;
                consecutive_rejections = 0;
            } else {
                rejected += 1;
                consecutive_rejections += 1;
            }
        }

        for entry in builder.breakdown().unwrap() {
            assert!(
                entry.percent <= 100.0,
                "{} overcommitted at {:.4}%",
                entry.resource_id,
                entry.percent
            );
        }
        blocks += 1;
    }
    let elapsed = start.elapsed();

    println!("Blocks packed:          {blocks}");
    println!("Transactions admitted:  {admitted}");
    println!("Rejected attempts:      {rejected}");
    println!("Elapsed:                {elapsed:?}");
    assert!(admitted > 0);
    assert!(rejected >= blocks * 20);
}

#[test]
fn stress_greedy_fill_saturates_bottleneck() {
    init_logger();
    println!("\n=== Greedy Fill Test ===\n");

    let catalog = Catalog::reference();
    let mut batch = Batch::new();
    for tx_type in catalog.transaction_types() {
        let fits = max_admissible(&batch, &tx_type.id, &catalog).unwrap();
        if fits > 0 {
            let outcome = try_add(&batch, &tx_type.id, fits, &catalog).unwrap();
            assert!(outcome.admitted, "{} x {} should fit", fits, tx_type.id);
            batch = outcome.batch;
        }
        println!("  {:<16} {:>6}", tx_type.id, batch.count_of(&tx_type.id));
    }

    let builder = BlockBuilder::with_batch(&catalog, batch);
    let bottleneck = builder.bottleneck().unwrap();
    println!(
        "Bottleneck: {:?} at {:.3}%",
        bottleneck.resource_id, bottleneck.utilization_percent
    );

    // 1428 transfers take the compute budget to within one transfer of full.
    assert_eq!(bottleneck.resource_id.unwrap().as_str(), "compute");
    assert!(bottleneck.utilization_percent > 99.9);
    assert!(bottleneck.utilization_percent <= 100.0);
    for tx_type in catalog.transaction_types() {
        assert_eq!(max_admissible(builder.batch(), &tx_type.id, &catalog).unwrap(), 0);
    }
}

#[test]
fn stress_packed_blocks_drive_base_fee() {
    init_logger();
    println!("\n=== Packed Blocks Feedback Loop Test ===\n");

    let catalog = Catalog::reference();
    let config = FeeMarketConfig::default();
    let mut state = create_initial_state(&config).unwrap();
    let mix: Vec<(TransactionTypeId, u64)> = MIX
        .iter()
        .map(|&(id, count)| (TransactionTypeId::from(id), count))
        .collect();

    let start = Instant::now();
    let mut fee_revenue = 0.0;
    for block in 0..300u64 {
        // Nominal demand: saturated for the first 150 blocks, then light.
        let demand = if block < 150 { 1.0 } else { 0.2 };
        let realized =
            calculate_demand_response(demand, state.current_base_fee(), config.baseline_fee);
        let rounds = (realized * 40.0).round() as u64;

        let mut builder = BlockBuilder::new(&catalog);
        'fill: for _ in 0..rounds {
            for (id, count) in &mix {
                if !builder.add(id, *count).unwrap() {
                    break 'fill;
                }
            }
        }

        let utilization = builder.block_utilization().unwrap();
        assert!((0.0..=1.0).contains(&utilization));
        fee_revenue += builder.estimated_fee(state.current_base_fee()).unwrap();
        if block % 50 == 0 {
            info!(
                "block {block}: base fee {:.4}, realized {:.3}, utilization {:.3}",
                state.current_base_fee(),
                realized,
                utilization
            );
        }
        state = state.advance(utilization);

        if block == 149 {
            println!("Fee after congestion: {:.4}", state.current_base_fee());
            assert!(state.current_base_fee() > config.initial_base_fee);
        }
    }
    let elapsed = start.elapsed();

    let peak = state
        .blocks()
        .iter()
        .map(|block| block.base_fee)
        .fold(0.0, f64::max);
    println!("Peak base fee:  {peak:.4}");
    println!("Final base fee: {:.4}", state.current_base_fee());
    println!("Fee revenue:    {fee_revenue:.0}");
    println!("Elapsed:        {elapsed:?}");

    assert_eq!(state.block_number(), 300);
    assert!(state.current_base_fee() < peak);
    assert!(state.current_base_fee() >= config.min_base_fee);
    assert!(fee_revenue > 0.0);
}
