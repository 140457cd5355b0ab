use crate::{
    error::LocationError,
    model::{Accuracy, PermissionStatus, Position, RawAddress},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod system;

/// The geolocation collaborator: permission, positioning, and reverse
/// geocoding. Treated as an opaque capability by the resolver.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    async fn request_permission(&self) -> Result<PermissionStatus, LocationError>;

    async fn current_position(&self, accuracy: Accuracy) -> Result<Position, LocationError>;

    /// Candidates ordered best-first; may be empty.
    async fn reverse_geocode(&self, position: Position) -> Result<Vec<RawAddress>, LocationError>;
}
