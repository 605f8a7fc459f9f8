use crate::domain::payment::PaymentRecord;
use crate::domain::provider::Processor;
use crate::store::{PaymentStore, ProviderStateStore};
use anyhow::Result;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

const RECORDS_KEY: &str = "payments:records";
const ELECTED_KEY: &str = "provider:elected";
const LOCK_KEY: &str = "provider:health-lock";

const RELEASE_LOCK_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
end
return 0
"#;

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }

    fn timeline_key(processor: Processor) -> String {
        format!("payments:timeline:{}", processor)
    }

    fn amounts_key(processor: Processor) -> String {
        format!("payments:amounts:{}", processor)
    }

    fn bound(v: Option<i64>, open: &str) -> String {
        v.map(|s| s.to_string()).unwrap_or_else(|| open.to_string())
    }
}

#[async_trait::async_trait]
impl PaymentStore for RedisStore {
    async fn record_payment(&self, record: &PaymentRecord) -> Result<()> {
        let mut conn = self.conn.clone();
        let other = record.processor.other();
        let id = record.correlation_id.as_str();
        let payload = serde_json::to_string(record)?;

        let mut pipe = redis::pipe();
        pipe.atomic()
            .zrem(Self::timeline_key(other), id)
            .ignore()
            .hdel(Self::amounts_key(other), id)
            .ignore()
            .zadd(Self::timeline_key(record.processor), id, record.score())
            .ignore()
            .hset(Self::amounts_key(record.processor), id, record.amount)
            .ignore()
            .hset(RECORDS_KEY, id, payload)
            .ignore();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn range_by_score(&self, processor: Processor, min: Option<i64>, max: Option<i64>) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(Self::timeline_key(processor))
            .arg(Self::bound(min, "-inf"))
            .arg(Self::bound(max, "+inf"))
            .query_async(&mut conn)
            .await?;
        Ok(ids)
    }

    async fn batch_get_amounts(&self, processor: Processor, ids: &[String]) -> Result<Vec<Option<f64>>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(Self::amounts_key(processor))
            .arg(ids)
            .query_async(&mut conn)
            .await?;

        Ok(values
            .into_iter()
            .map(|v| v.and_then(|s| s.parse::<f64>().ok()))
            .collect())
    }

    async fn get_by_correlation_id(&self, correlation_id: &str) -> Result<Option<PaymentRecord>> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.hget(RECORDS_KEY, correlation_id).await?;
        match payload {
            Some(p) => Ok(Some(serde_json::from_str::<PaymentRecord>(&p)?)),
            None => Ok(None),
        }
    }

    async fn reset(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let mut keys = vec![
            RECORDS_KEY.to_string(),
            ELECTED_KEY.to_string(),
            LOCK_KEY.to_string(),
        ];
        for processor in Processor::ALL {
            keys.push(Self::timeline_key(processor));
            keys.push(Self::amounts_key(processor));
        }
        let _: usize = conn.del(keys).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ProviderStateStore for RedisStore {
    async fn try_acquire_lock(&self, token: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.conn.clone();
        let reply: Option<String> = redis::cmd("SET")
            .arg(LOCK_KEY)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    async fn release_lock(&self, token: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: i64 = redis::Script::new(RELEASE_LOCK_SCRIPT)
            .key(LOCK_KEY)
            .arg(token)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn save_elected(&self, processor: Processor) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(ELECTED_KEY, processor.as_str()).await?;
        Ok(())
    }

    async fn load_elected(&self) -> Result<Option<Processor>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(ELECTED_KEY).await?;
        value.map(|v| v.parse::<Processor>()).transpose()
    }
}
