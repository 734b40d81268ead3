use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Script;
use tracing::info;

use crate::cache::{CacheError, CounterStore};

/// INCR + first-hit EXPIRE executed server-side as one atomic step.
const INCR_IN_WINDOW_SCRIPT: &str = r#"
local current = redis.call('INCR', KEYS[1])
if current == 1 then
  redis.call('EXPIRE', KEYS[1], tonumber(ARGV[1]))
end
return current
"#;

/// `CounterStore` over a multiplexed Redis connection. Cloning the
/// connection per call is cheap; all clones share one socket.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: MultiplexedConnection,
    incr_script: Script,
}

impl RedisCounterStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Connected to Redis");

        Ok(Self {
            conn,
            incr_script: Script::new(INCR_IN_WINDOW_SCRIPT),
        })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr_in_window(&self, key: &str, window_secs: u64) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let current: i64 = self
            .incr_script
            .key(key)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await?;
        Ok(current)
    }

    async fn incr(&self, key: &str) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let current: i64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;
        Ok(current)
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<i64> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(CacheError::Unavailable(format!("unexpected PING reply: {reply}")));
        }
        Ok(())
    }
}
