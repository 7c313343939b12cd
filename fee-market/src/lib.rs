//! # Blockspace Fee Market
//!
//! An **EIP-1559-style congestion pricing controller** and the block-by-block
//! simulation that exercises it.
//!
//! Every block, the base fee moves towards the level at which blocks are
//! filled to the target utilization. Demand responds to the fee through a
//! simple price elasticity, so the loop
//!
//! ```text
//! base fee ─► realized demand ─► utilization ─► next base fee
//! ```
//!
//! settles where realized demand meets the target.
//!
//! ## Quick start
//!
//! ```rust
//! use blockspace_fee_market::{
//!     calculator, simulation, stats, ConstantSample, FeeMarketConfig, SimulationOptions,
//! };
//!
//! let config = FeeMarketConfig::default();
//!
//! // A full block raises the fee by 12.5 %.
//! assert_eq!(calculator::calculate_new_base_fee(100.0, 1.0, &config), 112.5);
//!
//! // Twenty blocks of saturated demand, no noise.
//! let state = simulation::run_simulation(
//!     20,
//!     1.0,
//!     &config,
//!     &SimulationOptions::default(),
//!     &mut ConstantSample::default(),
//! )
//! .unwrap();
//! assert!(state.current_base_fee() > config.initial_base_fee);
//!
//! let summary = stats::calculate_stats(&state);
//! println!("average fee {:.2}, volatility {:.3}", summary.average_base_fee, summary.fee_volatility);
//! ```
//!
//! See [`calculator`] for the fee formula and [`simulation`] for the driver.

pub mod calculator;
pub mod config;
pub mod error;
pub mod sample;
pub mod scenario;
pub mod simulation;
pub mod state;
pub mod stats;


// Re-exports for convenience.
pub use config::FeeMarketConfig;
pub use error::FeeError;
pub use sample::{ConstantSample, RngSampleSource, SampleSource, SeedSequence};
pub use simulation::SimulationOptions;
pub use state::{BlockRecord, SimulationState};
pub use stats::Stats;
