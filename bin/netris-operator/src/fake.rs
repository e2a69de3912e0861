//! In-memory Netris used by tests

use async_trait::async_trait;
use netris_client::{ClientError, Endpoint, NetrisApi, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Create(Endpoint, Value),
    Update(Endpoint, i64, Value),
    Delete(Endpoint, i64),
}

pub struct FakeNetris {
    objects: Mutex<HashMap<Endpoint, Vec<Value>>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicI64,
}

impl FakeNetris {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
        }
    }

    /// Seed a collection
    pub fn with(self, endpoint: Endpoint, items: Vec<Value>) -> Self {
        self.objects.lock().unwrap().insert(endpoint, items);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn not_found(id: i64) -> ClientError {
        ClientError::Api {
            status: 404,
            message: format!("object {} not found", id),
        }
    }
}

#[async_trait]
impl NetrisApi for FakeNetris {
    async fn list(&self, endpoint: Endpoint) -> Result<Vec<Value>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(&endpoint)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, endpoint: Endpoint, payload: &Value) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut object = payload.clone();
        if let Value::Object(map) = &mut object {
            map.insert("id".into(), Value::from(id));
        }
        self.objects
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push(object);
        self.calls
            .lock()
            .unwrap()
            .push(Call::Create(endpoint, payload.clone()));
        Ok(id)
    }

    async fn update(&self, endpoint: Endpoint, id: i64, payload: &Value) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Update(endpoint, id, payload.clone()));
        let mut objects = self.objects.lock().unwrap();
        let items = objects.entry(endpoint).or_default();
        let slot = items
            .iter_mut()
            .find(|o| o["id"].as_i64() == Some(id))
            .ok_or_else(|| Self::not_found(id))?;
        let mut object = payload.clone();
        if let Value::Object(map) = &mut object {
            map.insert("id".into(), Value::from(id));
        }
        *slot = object;
        Ok(())
    }

    async fn delete(&self, endpoint: Endpoint, id: i64) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(endpoint, id));
        let mut objects = self.objects.lock().unwrap();
        let items = objects.entry(endpoint).or_default();
        let before = items.len();
        items.retain(|o| o["id"].as_i64() != Some(id));
        if items.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
