//! # Blockspace Resources
//!
//! Multi-dimensional block capacity for the blockspace simulator.
//!
//! A block is not limited by a single gas number. It has several independent
//! capacities (compute, storage I/O, bandwidth, memory, state growth) and every
//! transaction archetype consumes some of each. This crate answers two
//! questions for a batch of transactions:
//!
//! - **Which resource is the bottleneck?** See [`packing::find_bottleneck`].
//! - **Does another batch still fit?** See [`packing::try_add`], an
//!   all-or-nothing admission check over every resource.
//!
//! ## Quick start
//!
//! ```rust
//! use blockspace_resources::{packing, Batch, Catalog};
//!
//! let catalog = Catalog::reference();
//! let outcome = packing::try_add(&Batch::new(), &"token_swap".into(), 100, &catalog).unwrap();
//! assert!(outcome.admitted);
//!
//! let usage = packing::compute_usage(&outcome.batch, &catalog).unwrap();
//! let bottleneck = packing::find_bottleneck(&usage, &catalog);
//! println!("bottleneck: {:?} at {:.1}%", bottleneck.resource_id, bottleneck.utilization_percent);
//! ```

pub mod catalog;
pub mod error;
pub mod packing;


pub use catalog::{Catalog, Resource, ResourceCategory, ResourceId, TransactionType, TransactionTypeId};
pub use error::ResourceError;
pub use packing::{AddedTransaction, Batch, BlockBuilder, Bottleneck, ExceedCheck, ResourceUsage};
