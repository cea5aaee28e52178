use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::analysis::collaborators::KeyValueStore;

/// Record storage on Redis. One multiplexed connection is shared by all
/// requests.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid REDIS_URL")?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .context("Failed to connect to Redis")?;
        info!("Redis connection established");
        Ok(Self { connection })
    }
}

fn write_accepted(reply: Option<&str>) -> bool {
    reply.is_some_and(|r| r.eq_ignore_ascii_case("OK"))
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str) -> Result<bool> {
        let mut connection = self.connection.clone();
        let reply: Option<String> = connection
            .set(key, value)
            .await
            .with_context(|| format!("Redis SET {key} failed"))?;
        debug!("Redis SET {key} ({} bytes) -> {reply:?}", value.len());
        Ok(write_accepted(reply.as_deref()))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection
            .get(key)
            .await
            .with_context(|| format!("Redis GET {key} failed"))?;
        Ok(value)
    }
}
