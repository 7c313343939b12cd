//! Blockspace Benchmark Suite
//!
//! Run all benchmarks:
//! ```bash
//! cargo bench -p blockspace-bench
//! ```
//!
//! Run a specific benchmark group:
//! ```bash
//! cargo bench -p blockspace-bench --bench fee_market_bench
//! cargo bench -p blockspace-bench --bench packing_bench
//! ```
