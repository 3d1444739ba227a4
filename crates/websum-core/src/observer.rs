//! Progress/result/error reporting for a pipeline run.
//!
//! The pipeline never prints; it hands plain strings to an observer. The CLI
//! renders them on the terminal, tests record them.

/// Receives step announcements, results, errors, and per-URL progress ticks.
pub trait Observer {
    /// A new step is starting.
    fn step(&mut self, message: &str);
    /// A step produced a user-visible result.
    fn result(&mut self, message: &str);
    /// A step failed; the pipeline decides whether to continue.
    fn error(&mut self, message: &str);
    /// One unit of work out of `total` finished (successfully or not).
    fn progress(&mut self, done: usize, total: usize) {
        let _ = (done, total);
    }
}

/// One recorded observer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Step(String),
    Result(String),
    Error(String),
    Progress { done: usize, total: usize },
}

/// Observer that keeps every event in order. Handy for tests and for callers
/// that want to render the run after the fact.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    pub events: Vec<Event>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn steps(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Step(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Result(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn progress_ticks(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Progress { .. }))
            .count()
    }
}

impl Observer for RecordingObserver {
    fn step(&mut self, message: &str) {
        self.events.push(Event::Step(message.to_string()));
    }

    fn result(&mut self, message: &str) {
        self.events.push(Event::Result(message.to_string()));
    }

    fn error(&mut self, message: &str) {
        self.events.push(Event::Error(message.to_string()));
    }

    fn progress(&mut self, done: usize, total: usize) {
        self.events.push(Event::Progress { done, total });
    }
}
