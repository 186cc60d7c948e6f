use crate::merge::MergeStats;

/// Progress events emitted while indexing.
///
/// Core emits every variant; clients decide what to display and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// A package's scan and merge is about to start.
    PackageStarted { package: String },
    /// A file was cataloged for the first time.
    FileAdded { package: String, path: String },
    /// A cataloged file was rehashed and rewritten.
    FileUpdated { package: String, path: String },
    /// A cataloged file no longer exists on disk.
    FileRemoved { package: String, path: String },
    /// A package's changes were committed.
    PackageFinished { package: String, stats: MergeStats },
    /// A package was dropped from the catalog (gone from disk or blocked).
    PackagePruned { package: String },
}

/// Receiver of [`IndexEvent`]s.
///
/// pkgcat-cli implements this with a line printer; tests capture the events.
pub trait IndexReporter {
    fn emit(&self, event: IndexEvent);
}

/// Discards every event.
pub struct NoopReporter;

impl IndexReporter for NoopReporter {
    fn emit(&self, _: IndexEvent) {}
}

/// Collects events for assertions.
#[cfg(test)]
pub(crate) struct CaptureReporter {
    pub events: std::cell::RefCell<Vec<IndexEvent>>,
}

#[cfg(test)]
impl CaptureReporter {
    pub fn new() -> Self {
        Self {
            events: std::cell::RefCell::new(vec![]),
        }
    }

    /// Paths of file-level events, tagged `+`, `.` or `-`.
    pub fn file_changes(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                IndexEvent::FileAdded { path, .. } => Some(format!("+{path}")),
                IndexEvent::FileUpdated { path, .. } => Some(format!(".{path}")),
                IndexEvent::FileRemoved { path, .. } => Some(format!("-{path}")),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
impl IndexReporter for CaptureReporter {
    fn emit(&self, event: IndexEvent) {
        self.events.borrow_mut().push(event);
    }
}
