//! Blockspace Property-Based Invariant Tests
//!
//! Uses proptest to verify critical engine invariants across:
//! - Base fee floor, direction and elasticity of the fee controller
//! - Simulation history bookkeeping and determinism
//! - Block packing admission control and bottleneck selection
