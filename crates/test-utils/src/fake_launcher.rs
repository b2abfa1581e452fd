use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use icebreak::engine::WrapperOutcome;
use icebreak::errors::{BootstrapError, Result};
use icebreak::exec::LaunchBackend;
use icebreak::types::CanonicalIdentity;

/// Scripted response for one wrapper path.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Outcome(WrapperOutcome),
    /// Simulate a broken stdout pipe.
    Fatal,
}

/// A fake launcher that:
/// - records which wrappers were "launched", in order
/// - answers with a scripted outcome per path (default `Ready`).
#[derive(Debug, Clone, Default)]
pub struct FakeLauncher {
    launched: Arc<Mutex<Vec<PathBuf>>>,
    responses: HashMap<PathBuf, FakeResponse>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: impl Into<PathBuf>, response: FakeResponse) -> Self {
        self.responses.insert(path.into(), response);
        self
    }

    /// Shared handle on the launch log; stays valid after the launcher is
    /// moved into a `Bootstrapper`.
    pub fn launched(&self) -> Arc<Mutex<Vec<PathBuf>>> {
        Arc::clone(&self.launched)
    }
}

impl LaunchBackend for FakeLauncher {
    fn launch<'a>(
        &'a mut self,
        wrapper: &'a CanonicalIdentity,
    ) -> Pin<Box<dyn Future<Output = Result<WrapperOutcome>> + Send + 'a>> {
        let path = wrapper.as_path().to_path_buf();
        {
            let mut guard = self.launched.lock().unwrap();
            guard.push(path.clone());
        }

        let response = self
            .responses
            .get(&path)
            .cloned()
            .unwrap_or(FakeResponse::Outcome(WrapperOutcome::Ready));

        Box::pin(async move {
            match response {
                FakeResponse::Outcome(outcome) => Ok(outcome),
                FakeResponse::Fatal => Err(BootstrapError::ReadFailed {
                    path,
                    source: std::io::Error::other("simulated broken pipe"),
                }),
            }
        })
    }
}
