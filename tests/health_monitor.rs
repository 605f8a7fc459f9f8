use processor_gateway::domain::provider::{Processor, ProviderState};
use processor_gateway::error::GatewayError;
use processor_gateway::processors::mock::MockProcessor;
use processor_gateway::service::health_monitor::{CycleOutcome, HealthMonitor};
use processor_gateway::service::provider_selector::ProviderSelector;
use processor_gateway::store::store_memory::InMemoryStore;
use processor_gateway::store::ProviderStateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn monitor(store: Arc<InMemoryStore>, mock: Arc<MockProcessor>) -> HealthMonitor {
    HealthMonitor {
        selector: ProviderSelector::new(store.clone()),
        store,
        client: mock,
        interval: Duration::from_millis(50),
        lock_ttl: Duration::from_secs(5),
    }
}

#[tokio::test]
async fn elects_default_when_it_is_healthy() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new());
    mock.set_health(Processor::Fallback, None);

    let m = monitor(store.clone(), mock.clone());
    assert_eq!(m.run_cycle().await.unwrap(), CycleOutcome::Elected(Processor::Default));
    assert_eq!(m.selector.cached(), ProviderState::Default);
    assert_eq!(store.load_elected().await.unwrap(), Some(Processor::Default));
    // fallback is never probed once default is confirmed
    assert_eq!(mock.probes_total(), 1);
}

#[tokio::test]
async fn elects_fallback_when_default_probe_fails() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new());
    mock.set_health(Processor::Default, None);

    let m = monitor(store.clone(), mock);
    assert_eq!(m.run_cycle().await.unwrap(), CycleOutcome::Elected(Processor::Fallback));
    assert_eq!(m.selector.current_provider().await, Processor::Fallback);
}

#[tokio::test]
async fn elects_fallback_when_default_reports_failing() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new());
    mock.set_failing(Processor::Default, true);

    let m = monitor(store, mock);
    assert_eq!(m.run_cycle().await.unwrap(), CycleOutcome::Elected(Processor::Fallback));
}

#[tokio::test]
async fn keeps_previous_choice_when_both_fail() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new());
    mock.set_health(Processor::Default, None);

    let m = monitor(store.clone(), mock.clone());
    m.run_cycle().await.unwrap();
    assert_eq!(m.selector.cached(), ProviderState::Fallback);

    mock.set_failing(Processor::Fallback, true);
    let err = m.run_cycle().await.unwrap_err();
    assert!(matches!(err, GatewayError::HealthProbe(_)));
    assert_eq!(m.selector.cached(), ProviderState::Fallback);
    assert_eq!(store.load_elected().await.unwrap(), Some(Processor::Fallback));
}

#[tokio::test]
async fn lock_is_released_after_an_inconclusive_cycle() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new());
    mock.set_health(Processor::Default, None);
    mock.set_health(Processor::Fallback, None);

    let m = monitor(store.clone(), mock);
    assert!(m.run_cycle().await.is_err());
    assert!(store.try_acquire_lock("probe", Duration::from_secs(1)).await.unwrap());
}

#[tokio::test]
async fn instances_never_probe_at_the_same_time() {
    let store = Arc::new(InMemoryStore::new());
    let mock = Arc::new(MockProcessor::new().with_probe_delay(Duration::from_millis(30)));
    mock.set_health(Processor::Default, None);

    let instances: Vec<HealthMonitor> = (0..4).map(|_| monitor(store.clone(), mock.clone())).collect();
    let mut handles = Vec::new();
    for m in instances {
        handles.push(tokio::spawn(async move { m.run_cycle().await }));
    }

    let mut elected = 0;
    let mut skipped = 0;
    for h in handles {
        match h.await.unwrap().unwrap() {
            CycleOutcome::Elected(_) => elected += 1,
            CycleOutcome::Skipped => skipped += 1,
        }
    }

    assert_eq!(mock.max_concurrent_probes(), 1);
    assert!(elected >= 1);
    assert_eq!(elected + skipped, 4);
}

#[tokio::test]
async fn skipped_instance_adopts_the_elected_provider() {
    let store = Arc::new(InMemoryStore::new());
    store.save_elected(Processor::Fallback).await.unwrap();
    assert!(store.try_acquire_lock("other-instance", Duration::from_secs(5)).await.unwrap());

    let m = monitor(store, Arc::new(MockProcessor::new()));
    assert_eq!(m.run_cycle().await.unwrap(), CycleOutcome::Skipped);
    assert_eq!(m.selector.cached(), ProviderState::Fallback);
}

#[tokio::test]
async fn run_loop_elects_on_first_tick_and_stops_on_cancel() {
    let store = Arc::new(InMemoryStore::new());
    let m = monitor(store.clone(), Arc::new(MockProcessor::new()));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(m.run(cancel.clone()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.load_elected().await.unwrap(), Some(Processor::Default));

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
}
