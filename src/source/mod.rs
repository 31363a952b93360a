//! External collaborators: the event repository and the location source.
//!
//! Both are injected into the engine as trait objects so the feed can be
//! driven by scripted fakes in tests.

pub mod http_repository;
pub mod location;
pub mod repository;

pub use http_repository::HttpEventRepository;
pub use location::{AuthorizationState, LocationSnapshot, LocationSource, SharedLocation};
pub use repository::{EventRepository, RepositoryError};
