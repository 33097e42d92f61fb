#![forbid(unsafe_code)]

//! Headless circle geometry used by `canopy`.
//!
//! Everything here is domain-agnostic: circles in, circles out. The sibling packer follows the
//! front-chain algorithm of Wang et al. ("Visualization of large hierarchical data by circle
//! packing"), and the enclosing circle is Welzl's move-to-front search over a shuffled input.
//! Shuffling uses [`Lcg`] so results are reproducible bit for bit.

pub mod circle;
pub mod enclose;
pub mod grid;
pub mod lcg;
pub mod siblings;

pub use circle::Circle;
pub use enclose::enclose;
pub use grid::SpatialGrid;
pub use lcg::Lcg;
pub use siblings::pack_siblings;
