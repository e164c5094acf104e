/*
Location Directory Port

Read-only access to the user-location directory. Adapters translate the search
area into whatever query their store understands; the proximity service applies
the final candidate rules on top of what they return.
*/

use async_trait::async_trait;

pub use crate::domain::entities::location::{BoundingBox, DirectoryError, LocationRecord};

/// Result type for directory operations
pub type DirectoryResult<T> = Result<T, DirectoryError>;

#[async_trait]
pub trait LocationDirectoryPort: Send + Sync {
    /// Records inside `area` that carry a push token, excluding `exclude_user_id`.
    async fn find_in_area(
        &self,
        area: &BoundingBox,
        exclude_user_id: &str,
    ) -> DirectoryResult<Vec<LocationRecord>>;
}
