//! Data Transfer Objects for REST request/response serialization.

pub mod feed_dto;
pub mod filter_dto;
pub mod location_dto;

pub use feed_dto::*;
pub use filter_dto::*;
pub use location_dto::*;
