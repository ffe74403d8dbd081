#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use trivio::{RetryingRequester, Sleeper};

/// Records requested sleeps instead of waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// A requester that never actually sleeps, plus a handle to what it slept.
pub fn recording_requester() -> (RetryingRequester, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let requester = RetryingRequester::new()
        .unwrap()
        .with_sleeper(sleeper.clone());
    (requester, sleeper)
}

/// A URL on a local port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}
