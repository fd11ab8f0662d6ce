#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use carledger::{ConditionalPutError, Event, KvStore, MemoryStore, Transaction};

pub fn sample_event(id: &str, car_id: &str) -> Event {
    Event::new(id, car_id)
        .with_owner("bob")
        .with_day_code("2024-01-01")
        .with_location("51.5,-0.1")
        .with_image("img://1")
        .with_describe("rear bumper")
        .with_iot("dev1|dev2")
}

pub fn event_args(id: &str, car_id: &str) -> Vec<String> {
    [id, car_id, "bob", "2024-01-01", "loc", "img", "desc", "dev1|dev2"]
        .map(String::from)
        .to_vec()
}

pub fn sample_transaction(id: &str) -> Transaction {
    Transaction::from_args(
        [id, "a", "b", "sa", "sb", "pa", "pb", "2024-01-01T00:00:00Z"].map(String::from),
    )
}

/// Memory store that fails reads or writes of chosen keys and counts puts.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    fail_get: Mutex<HashSet<String>>,
    fail_put: Mutex<HashSet<String>>,
    puts: AtomicUsize,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_get(&self, key: &str) {
        self.fail_get.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_put(&self, key: &str) {
        self.fail_put.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.fail_get.lock().unwrap().clear();
        self.fail_put.lock().unwrap().clear();
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    fn check_put(&self, key: &str) -> io::Result<()> {
        if self.fail_put.lock().unwrap().contains(key) {
            return Err(io::Error::other(format!("injected write failure on {key}")));
        }
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl KvStore for FaultyStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        if self.fail_get.lock().unwrap().contains(key) {
            return Err(io::Error::other(format!("injected read failure on {key}")));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        self.check_put(key)?;
        self.inner.put(key, value)
    }

    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError> {
        self.check_put(key)?;
        self.inner.put_if(key, expected, value)
    }
}

type Hook = Box<dyn FnOnce(&MemoryStore) + Send>;

/// Memory store that runs a hook once, right after the first read of a
/// chosen key returns. The hook stands in for a second writer whose
/// read-modify-write lands between our get and our put.
pub struct InterleavingStore {
    pub inner: Arc<MemoryStore>,
    key: String,
    hook: Mutex<Option<Hook>>,
}

impl InterleavingStore {
    pub fn new(inner: Arc<MemoryStore>, key: &str, hook: impl FnOnce(&MemoryStore) + Send + 'static) -> Self {
        InterleavingStore {
            inner,
            key: key.to_string(),
            hook: Mutex::new(Some(Box::new(hook))),
        }
    }
}

impl KvStore for InterleavingStore {
    fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let value = self.inner.get(key)?;
        if key == self.key {
            let hook = self.hook.lock().unwrap().take();
            if let Some(hook) = hook {
                hook(&self.inner);
            }
        }
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        self.inner.put(key, value)
    }

    fn put_if(&self, key: &str, expected: &str, value: &[u8]) -> Result<(), ConditionalPutError> {
        self.inner.put_if(key, expected, value)
    }
}
