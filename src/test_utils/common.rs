use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::application::ports::output::location_directory_port::{
    BoundingBox, DirectoryError, DirectoryResult, LocationDirectoryPort, LocationRecord,
};
use crate::application::ports::output::push_delivery_port::{
    DeliveryReceipt, DispatchError, PushDeliveryPort, PushMessage,
};

/// Directory double that returns a canned answer and counts lookups.
pub struct StubDirectory {
    response: DirectoryResult<Vec<LocationRecord>>,
    lookups: AtomicUsize,
}

impl StubDirectory {
    pub fn with_records(records: Vec<LocationRecord>) -> Self {
        Self {
            response: Ok(records),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: DirectoryError) -> Self {
        Self {
            response: Err(error),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationDirectoryPort for StubDirectory {
    async fn find_in_area(
        &self,
        _area: &BoundingBox,
        _exclude_user_id: &str,
    ) -> DirectoryResult<Vec<LocationRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Transport double with per-token latency and failures.
#[derive(Default)]
pub struct StubTransport {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, token: &str, delay: Duration) -> Self {
        self.delays.insert(token.to_string(), delay);
        self
    }

    pub fn failing(mut self, token: &str) -> Self {
        self.failing.insert(token.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDeliveryPort for StubTransport {
    async fn send(&self, message: &PushMessage) -> Result<DeliveryReceipt, DispatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&message.token) {
            tokio::time::sleep(*delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().unwrap().push(message.token.clone());

        if self.failing.contains(&message.token) {
            return Err(DispatchError::InvalidToken("NotRegistered".to_string()));
        }
        Ok(DeliveryReceipt(serde_json::json!({
            "success": 1,
            "failure": 0,
            "results": [{ "message_id": format!("msg-{}", message.token) }]
        })))
    }
}
