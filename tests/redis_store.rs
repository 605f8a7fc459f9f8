//! Runs against a live Redis: `cargo test --test redis_store -- --ignored`.
//! Uses `REDIS_URL` when set. The gateway keys on that server are wiped.

use chrono::{TimeZone, Utc};
use processor_gateway::domain::payment::PaymentRecord;
use processor_gateway::domain::provider::Processor;
use processor_gateway::store::store_redis::RedisStore;
use processor_gateway::store::{PaymentStore, ProviderStateStore};
use std::time::Duration;

fn record(id: &str, processor: Processor, secs: i64, amount: f64) -> PaymentRecord {
    PaymentRecord {
        correlation_id: id.to_string(),
        amount,
        processor,
        requested_at: Utc.timestamp_opt(1_752_000_000 + secs, 0).unwrap(),
    }
}

#[tokio::test]
#[ignore = "needs a running redis"]
async fn redis_store_round_trip() {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379/".to_string());
    let store = RedisStore::connect(&url).await.unwrap();
    store.ping().await.unwrap();
    store.reset().await.unwrap();

    store.record_payment(&record("a", Processor::Default, 10, 19.9)).await.unwrap();
    store.record_payment(&record("b", Processor::Default, 20, 0.1)).await.unwrap();
    store.record_payment(&record("c", Processor::Default, 30, 5.0)).await.unwrap();

    let lo = record("", Processor::Default, 10, 0.0).score();
    let hi = record("", Processor::Default, 20, 0.0).score();
    let ids = store.range_by_score(Processor::Default, Some(lo), Some(hi)).await.unwrap();
    assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

    let all = store.range_by_score(Processor::Default, None, None).await.unwrap();
    assert_eq!(all.len(), 3);
    let amounts = store
        .batch_get_amounts(Processor::Default, &["a".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(amounts, vec![Some(19.9), None]);

    // re-recording under the other processor moves the entry
    store.record_payment(&record("a", Processor::Fallback, 40, 19.9)).await.unwrap();
    let defaults = store.range_by_score(Processor::Default, None, None).await.unwrap();
    assert!(!defaults.contains(&"a".to_string()));
    let found = store.get_by_correlation_id("a").await.unwrap().unwrap();
    assert_eq!(found.processor, Processor::Fallback);

    assert!(store.try_acquire_lock("one", Duration::from_secs(5)).await.unwrap());
    assert!(!store.try_acquire_lock("two", Duration::from_secs(5)).await.unwrap());
    store.release_lock("two").await.unwrap();
    assert!(!store.try_acquire_lock("two", Duration::from_secs(5)).await.unwrap());
    store.release_lock("one").await.unwrap();
    assert!(store.try_acquire_lock("two", Duration::from_secs(5)).await.unwrap());
    store.release_lock("two").await.unwrap();

    store.save_elected(Processor::Fallback).await.unwrap();
    assert_eq!(store.load_elected().await.unwrap(), Some(Processor::Fallback));

    store.reset().await.unwrap();
    assert!(store.range_by_score(Processor::Fallback, None, None).await.unwrap().is_empty());
    assert_eq!(store.load_elected().await.unwrap(), None);
}
