//! Loopback transport
//!
//! Serves requests straight from an in-process `Registry`. Keeps a log of
//! every request it was handed and can inject transport faults, which is
//! what the session tests use to observe "no request was issued".

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use inkfont_net::{Method, NetError, Request, Response, Transport};
use parking_lot::Mutex;

use crate::Registry;

/// Failure to produce instead of the next response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Connection-level failure
    Network(String),
    /// Non-JSON answer with this status
    Status(u16),
    /// 200 with a body that is not an envelope
    Garbage,
    /// Serve normally; lets a later fault target a later request
    Pass,
}

pub struct LoopbackTransport {
    registry: Mutex<Arc<Registry>>,
    log: Mutex<Vec<(Method, String)>>,
    faults: Mutex<VecDeque<Fault>>,
    latency: Mutex<Option<Duration>>,
}

impl LoopbackTransport {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry: Mutex::new(registry),
            log: Mutex::new(Vec::new()),
            faults: Mutex::new(VecDeque::new()),
            latency: Mutex::new(None),
        }
    }

    pub fn registry(&self) -> Arc<Registry> {
        self.registry.lock().clone()
    }

    /// Serve from `registry` from now on, as if the server came back
    /// with fresh state
    pub fn restart(&self, registry: Arc<Registry>) {
        tracing::info!("Loopback backend restarted");
        *self.registry.lock() = registry;
    }

    /// Queue a fault for the next unanswered request
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().push_back(fault);
    }

    /// Delay every answer
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Paths of all requests so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().iter().map(|(_, p)| p.clone()).collect()
    }

    /// How many requests hit `path`
    pub fn count(&self, path: &str) -> usize {
        self.log.lock().iter().filter(|(_, p)| p == path).count()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }
}

impl Transport for LoopbackTransport {
    fn send(&self, request: Request) -> Result<Response, NetError> {
        self.log.lock().push((request.method, request.path().to_string()));

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        let fault = self.faults.lock().pop_front();
        match fault {
            Some(Fault::Network(msg)) => Err(NetError::Network(msg)),
            Some(Fault::Status(status)) => Ok(Response {
                status,
                headers: vec![],
                body: b"Internal Server Error".to_vec(),
            }),
            Some(Fault::Garbage) => Ok(Response {
                status: 200,
                headers: vec![],
                body: b"<html>oops</html>".to_vec(),
            }),
            Some(Fault::Pass) | None => {
                let registry = self.registry();
                Ok(registry.handle(&request))
            }
        }
    }
}
