//! # Galaxy Router - Jump Routing Across Tens of Millions of Star Systems
//!
//! This crate answers three questions about a static dataset of star systems:
//! which systems lie near a point, what is the shortest sequence of jumps
//! between two systems when no single jump may exceed a given range, and
//! where a system lies when only its 64-bit identifier is known.
//!
//! ## Key Features
//!
//! - **Spatial Queries**: Radius and k-nearest queries over an STR-packed R-tree
//!   (see [`galaxy_router_spatial`])
//! - **A\* Routing**: Optimal routes with neighbours found on demand; no jump graph
//!   is ever built
//! - **id64 Decoding**: Sector, boxel and sequence fields of packed system addresses
//! - **Region Map**: Run-length encoded region lookups with O(log R) queries
//! - **Shared Engine**: A cloneable [`RoutingEngine`] serving concurrent readers
//! - **Cancellation**: Long searches can be aborted from another thread
//!
//! ## Quick Start
//!
//! ```rust
//! use galaxy_router::RoutingEngine;
//! use galaxy_router_spatial::StarSystem;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = RoutingEngine::builder()
//!     .node_capacity(32)
//!     .load(vec![
//!         StarSystem::new(1, 0.0, 0.0, 0.0),
//!         StarSystem::new(2, 5.0, 0.0, 0.0),
//!         StarSystem::new(3, 11.0, 0.0, 0.0),
//!     ])?;
//!
//! let route = engine.find_route(1, 3, 6.0)?;
//! assert_eq!(route.system_ids, vec![1, 2, 3]);
//! assert_eq!(route.total_distance, 11.0);
//!
//! // no path is an empty route, not an error
//! assert!(engine.find_route(1, 3, 4.9)?.is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`codec`] - id64 address decoding and the region map
//! - [`errors`] - Error types and result definitions
//! - [`pathfinder`] - A* search and route results
//! - [`engine`] - The routing engine facade
//! - [`router_builder`] / [`router_config`] - Engine configuration

pub mod codec;
pub mod engine;
pub mod errors;
pub mod pathfinder;
pub mod router_builder;
pub mod router_config;

pub use engine::RoutingEngine;
pub use errors::{ErrorKind, RouterError, RouterResult};
pub use pathfinder::{CancellationToken, PathFinder, RouteResult};
pub use router_builder::RouterBuilder;
pub use router_config::RouterConfig;
