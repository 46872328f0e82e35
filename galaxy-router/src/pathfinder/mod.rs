//! A* route search over a [`SpatialIndex`](galaxy_router_spatial::SpatialIndex).
//!
//! The jump graph is never materialized: the neighbours of a system are
//! every system within jump range, found with a radius query each time the
//! system is expanded.

mod astar;
mod cancel;
mod route;

pub use astar::PathFinder;
pub use cancel::CancellationToken;
pub use route::RouteResult;
