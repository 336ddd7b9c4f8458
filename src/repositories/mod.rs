pub mod project;
pub mod task;

pub use project::ProjectRepository;
pub use task::TaskRepository;

use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use crate::error::AppResult;

/// Base repository trait for common CRUD operations.
///
/// Every method is generic over the connection so the same code runs on the
/// pool or inside a request's transaction.
#[async_trait]
pub trait Repository<T>
where
    T: Send + Sync,
{
    /// Find entity by ID
    async fn find_by_id<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<T>;

    /// Delete entity by ID
    async fn delete<C: ConnectionTrait>(db: &C, id: i32) -> AppResult<()>;

    /// List all entities in their natural order
    async fn list<C: ConnectionTrait>(db: &C) -> AppResult<Vec<T>>;

    /// Count total entities
    async fn count<C: ConnectionTrait>(db: &C) -> AppResult<u64>;
}
