//! wb-core: foundation types for wireboard.
//!
//! Contains:
//! - units (display-unit aware Length / Mass quantities backed by uom)
//! - currency (fixed-point USD amounts)
//! - numeric (Real + tolerances + float helpers)
//! - optional (zero-overhead optionals for types with a "none" sentinel)
//! - singlevec / freelist (collections used by resources)
//! - geom (Point, AABB, Footprint)
//! - error (shared error types)

pub mod currency;
pub mod error;
pub mod freelist;
pub mod geom;
pub mod numeric;
pub mod optional;
pub mod singlevec;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use currency::Usd;
pub use error::{CoreError, CoreResult, FormatError, FreeListError};
pub use freelist::FreeList;
pub use geom::{Aabb, Footprint, Point};
pub use numeric::*;
pub use optional::{Noneable, Optional};
pub use singlevec::SingleVec;
pub use units::*;
