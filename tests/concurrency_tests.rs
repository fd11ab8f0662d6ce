mod common;

use std::sync::Arc;
use std::thread;

use carledger::{
    Codec, Concurrency, DEFAULT_EVENT_KEY, Event, KvStore, Ledger, LedgerError, MemoryStore,
};
use common::{InterleavingStore, sample_event};

/// Append `event` to the event collection behind the ledger's back, the way
/// a second writer would.
fn foreign_append(store: &MemoryStore, event: Event) {
    let codec = Codec::default();
    let mut events: Vec<Event> = match store.get(DEFAULT_EVENT_KEY).unwrap() {
        Some(bytes) => codec.decode(&bytes).unwrap(),
        None => Vec::new(),
    };
    events.push(event);
    store.put(DEFAULT_EVENT_KEY, &codec.encode(&events).unwrap()).unwrap();
}

fn racing_ledger(concurrency: Concurrency) -> (Arc<MemoryStore>, Ledger<InterleavingStore>) {
    let inner = Arc::new(MemoryStore::new());
    let store = InterleavingStore::new(Arc::clone(&inner), DEFAULT_EVENT_KEY, |store| {
        foreign_append(store, sample_event("theirs", "car1"));
    });
    let ledger = Ledger::builder(store)
        .concurrency(concurrency)
        .build()
        .unwrap();
    (inner, ledger)
}

fn stored_ids(store: &MemoryStore) -> Vec<String> {
    let bytes = store.get(DEFAULT_EVENT_KEY).unwrap().unwrap_or_default();
    Codec::default()
        .decode::<Event>(&bytes)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect()
}

#[test]
fn test_unguarded_append_loses_interleaved_update() {
    let (inner, ledger) = racing_ledger(Concurrency::Unguarded);

    ledger.append_event(sample_event("ours", "car1")).unwrap();

    // The foreign append landed between our read and our write and was
    // overwritten.
    assert_eq!(stored_ids(&inner), ["ours"]);
}

#[test]
fn test_compare_and_swap_detects_interleaved_update() {
    let (inner, ledger) = racing_ledger(Concurrency::CompareAndSwap);

    let err = ledger.append_event(sample_event("ours", "car1")).unwrap_err();

    match &err {
        LedgerError::Conflict {
            key,
            expected,
            actual,
        } => {
            assert_eq!(key, DEFAULT_EVENT_KEY);
            assert_eq!(expected, "");
            assert!(!actual.is_empty());
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
    assert!(err.is_retryable());
    assert_eq!(stored_ids(&inner), ["theirs"]);

    // The hook only fires once; re-issuing the append now succeeds.
    ledger.append_event(sample_event("ours", "car1")).unwrap();
    assert_eq!(stored_ids(&inner), ["theirs", "ours"]);
}

#[test]
fn test_compare_and_swap_without_contention() {
    let ledger = Ledger::builder(MemoryStore::new())
        .concurrency(Concurrency::CompareAndSwap)
        .build()
        .unwrap();

    ledger.init("0").unwrap();
    for i in 0..5 {
        ledger.append_event(sample_event(&format!("e{i}"), "car1")).unwrap();
    }

    assert_eq!(ledger.events().query_by_car("car1").unwrap().len(), 5);
}

#[test]
fn test_single_writer_admits_appends_one_at_a_time() {
    let ledger = Arc::new(
        Ledger::builder(MemoryStore::new())
            .concurrency(Concurrency::SingleWriter)
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for i in 0..25 {
                    ledger
                        .append_event(sample_event(&format!("t{t}-e{i}"), &format!("car{t}")))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.events().events().unwrap().len(), 200);
    for t in 0..8 {
        let ids: Vec<String> = ledger
            .events()
            .query_by_car(&format!("car{t}"))
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        let expected: Vec<String> = (0..25).map(|i| format!("t{t}-e{i}")).collect();
        assert_eq!(ids, expected);
    }
}

#[test]
fn test_compare_and_swap_threads_never_lose_updates() {
    let ledger = Arc::new(
        Ledger::builder(MemoryStore::new())
            .concurrency(Concurrency::CompareAndSwap)
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let mut landed = 0;
                for i in 0..20 {
                    let event = sample_event(&format!("t{t}-e{i}"), "car1");
                    loop {
                        match ledger.append_event(event.clone()) {
                            Ok(()) => break,
                            Err(err) if err.is_retryable() => continue,
                            Err(err) => panic!("append failed: {err}"),
                        }
                    }
                    landed += 1;
                }
                landed
            })
        })
        .collect();
    let landed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(landed, 80);
    assert_eq!(ledger.events().events().unwrap().len(), 80);
}

#[test]
fn test_ledgers_sharing_one_store_see_each_others_appends() {
    let shared = Arc::new(MemoryStore::new());
    let first = Ledger::new(Arc::clone(&shared));
    let second = Ledger::new(Arc::clone(&shared));

    first.init("0").unwrap();
    first.append_event(sample_event("e1", "car1")).unwrap();
    second.append_event(sample_event("e2", "car1")).unwrap();

    assert_eq!(stored_ids(&shared), ["e1", "e2"]);
    assert_eq!(first.events().query_by_car("car1").unwrap().len(), 2);
    assert_eq!(
        first.store().get(DEFAULT_EVENT_KEY).unwrap(),
        shared.get(DEFAULT_EVENT_KEY).unwrap()
    );
}

#[test]
fn test_compare_and_swap_guards_across_ledgers_on_a_shared_store() {
    let shared = Arc::new(MemoryStore::new());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            // Each thread has its own ledger, so no admission lock is shared;
            // only the version stamp on the store keeps appends from being lost.
            let ledger = Ledger::builder(Arc::clone(&shared))
                .concurrency(Concurrency::CompareAndSwap)
                .build()
                .unwrap();
            thread::spawn(move || {
                for i in 0..20 {
                    let event = sample_event(&format!("t{t}-e{i}"), "car1");
                    loop {
                        match ledger.append_event(event.clone()) {
                            Ok(()) => break,
                            Err(err) if err.is_retryable() => continue,
                            Err(err) => panic!("append failed: {err}"),
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stored_ids(&shared).len(), 80);
}
