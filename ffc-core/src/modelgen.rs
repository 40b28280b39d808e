use crate::BoxError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Result of one photo-to-model run
#[derive(Debug, Clone)]
pub struct GeneratedModel {
    pub model_path: String,
}

/// The photo-to-3D-model automation service. A single call can take tens of
/// seconds; the retry policy belongs to the caller, not the adapter.
#[async_trait]
pub trait ModelGenerator: Send + Sync {
    async fn generate(&self, photo_path: &str, output_dir: &str)
        -> Result<GeneratedModel, BoxError>;
}

/// Scripted generator for tests. Outcomes are consumed front-to-back; once
/// the script runs dry every further call succeeds.
pub struct MockModelGenerator {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<String, String>>>,
}

impl MockModelGenerator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(VecDeque::new()),
        }
    }

    /// Queue an outcome for the next call: Ok(model_path) or Err(message).
    pub fn push_outcome(&self, outcome: Result<&str, &str>) {
        self.script.lock().unwrap().push_back(
            outcome
                .map(|s| s.to_string())
                .map_err(|e| e.to_string()),
        );
    }

    /// A generator that fails `n` times before the scripted successes run.
    pub fn failing_times(n: usize) -> Self {
        let mock = Self::new();
        for _ in 0..n {
            mock.push_outcome(Err("automation timed out"));
        }
        mock
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockModelGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGenerator for MockModelGenerator {
    async fn generate(
        &self,
        photo_path: &str,
        output_dir: &str,
    ) -> Result<GeneratedModel, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.script.lock().unwrap().pop_front() {
            Some(Ok(path)) => Ok(GeneratedModel { model_path: path }),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(GeneratedModel {
                model_path: format!(
                    "{}/{}.stl",
                    output_dir.trim_end_matches('/'),
                    photo_path.rsplit('/').next().unwrap_or("model")
                ),
            }),
        }
    }
}
