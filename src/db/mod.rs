pub mod memory;
pub mod postgres;
pub mod redis;
pub mod store;

pub use self::memory::{InMemoryPlaceRepository, InMemoryRecommendationStore};
pub use self::postgres::{create_pool, PgPlaceRepository};
pub use self::redis::{create_redis_client, CacheWriterHandle, RedisRecommendationStore};
pub use self::store::{PlaceRepository, RecommendationStore};
