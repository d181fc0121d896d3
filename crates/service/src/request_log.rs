//! Per-instance request audit trail.
//!
//! Attach one to a `QlikSense` facade to capture every request its services
//! issue. Each facade gets its own log; nothing is shared implicitly.

use std::sync::{Mutex, MutexGuard, PoisonError};

use models::RecordedRequest;

#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Mutex<Vec<RecordedRequest>>,
}

impl RequestLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: RecordedRequest) {
        self.lock().push(entry);
    }

    /// Snapshot of everything recorded so far, oldest first.
    pub fn entries(&self) -> Vec<RecordedRequest> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of recorded requests with this method whose path is `path_prefix`
    /// or lies below it. `/qrs/user` matches `/qrs/user/count`, not `/qrs/userx`.
    pub fn count_matching(&self, method: &str, path_prefix: &str) -> usize {
        let prefix = path_prefix.trim_end_matches('/');
        self.lock()
            .iter()
            .filter(|e| e.method == method && under_path(&e.path, prefix))
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedRequest>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn under_path(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
