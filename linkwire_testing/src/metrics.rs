//! Metric assertions against a [`DebuggingRecorder`].

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};

/// Creates a debugging recorder and snapshotter for metrics testing.
#[must_use]
pub fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

/// Counter values captured from one snapshot.
#[derive(Debug, Default)]
pub struct Counters(Vec<(String, Vec<(String, String)>, u64)>);

impl Counters {
    /// Take a snapshot of every counter `snapshotter` has seen.
    #[must_use]
    pub fn capture(snapshotter: &Snapshotter) -> Self {
        let entries = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, _, _, value)| match value {
                DebugValue::Counter(count) => {
                    let key = key.key();
                    let labels = key
                        .labels()
                        .map(|l| (l.key().to_owned(), l.value().to_owned()))
                        .collect();
                    Some((key.name().to_owned(), labels, count))
                }
                _ => None,
            })
            .collect();
        Self(entries)
    }

    /// Total of the counter `name`, optionally restricted to one label pair.
    ///
    /// Returns zero if the counter was never recorded.
    #[must_use]
    pub fn get(&self, name: &str, label: Option<(&str, &str)>) -> u64 {
        self.0
            .iter()
            .filter(|(n, _, _)| n == name)
            .filter(|(_, labels, _)| {
                label.is_none_or(|(key, value)| labels.iter().any(|(k, v)| k == key && v == value))
            })
            .map(|(_, _, count)| *count)
            .sum()
    }
}

/// Run `f` with a local recorder and return the counters it recorded.
pub fn record<F: FnOnce()>(f: F) -> Counters {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, f);
    Counters::capture(&snapshotter)
}
