// Event sink - the one-way surface the worker reports through
//
// The presentation layer (GUI, TUI, plain console) implements this and
// is responsible for marshalling onto its own update mechanism if it is
// not thread-safe; the worker just calls straight into it.

/// Receiver for worker-side events. All methods may be invoked from the
/// download worker at any time.
pub trait EventSink: Send + Sync {
    /// A raw output line from the downloader, or an orchestrator message.
    fn log_line(&self, text: &str);

    /// Overall progress on the unified 0-100 scale.
    fn progress(&self, percent: f32);

    /// Short human-readable state ("(2/5) starting: ...", "waiting 09:59").
    fn status(&self, text: &str);
}

/// Sink that discards everything. Useful as a default and in tests that
/// only care about return values.
pub struct NullSink;

impl EventSink for NullSink {
    fn log_line(&self, _text: &str) {}
    fn progress(&self, _percent: f32) {}
    fn status(&self, _text: &str) {}
}

#[cfg(test)]
pub(crate) mod test_sink {
    use std::sync::Mutex;

    use super::EventSink;

    /// Records every event for assertions.
    #[derive(Default)]
    pub struct RecordingSink {
        logs: Mutex<Vec<String>>,
        percents: Mutex<Vec<f32>>,
        statuses: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        pub fn logs(&self) -> Vec<String> {
            self.logs.lock().unwrap().clone()
        }

        pub fn percents(&self) -> Vec<f32> {
            self.percents.lock().unwrap().clone()
        }

        pub fn statuses(&self) -> Vec<String> {
            self.statuses.lock().unwrap().clone()
        }
    }

    impl EventSink for RecordingSink {
        fn log_line(&self, text: &str) {
            self.logs.lock().unwrap().push(text.to_string());
        }

        fn progress(&self, percent: f32) {
            self.percents.lock().unwrap().push(percent);
        }

        fn status(&self, text: &str) {
            self.statuses.lock().unwrap().push(text.to_string());
        }
    }
}
