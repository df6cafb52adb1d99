// Service exports
pub mod cache;
pub mod cofounder;
pub mod memory;
pub mod postgres;
pub mod postgrest;
pub mod repository;
pub mod saved;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use cofounder::{CofounderError, CofounderService, MatchingOptions};
pub use memory::{InMemoryRepository, ReferenceData};
pub use postgres::PostgresClient;
pub use postgrest::{PostgrestClient, PostgrestTables};
pub use repository::{FounderRepository, MatchQuery, RepositoryError};
pub use saved::{InMemorySavedStore, SavedProfileStore, StoreError};
