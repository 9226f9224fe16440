//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use setup_main::{Hooks, MainTask, TaskResult};

/// One reported lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Start,
    Exception(String),
    ShutdownObserved,
    Cancel,
    Finish,
    Duration(f64),
    End,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Start => "start",
            Event::Exception(_) => "exception",
            Event::ShutdownObserved => "shutdown_observed",
            Event::Cancel => "cancel",
            Event::Finish => "finish",
            Event::Duration(_) => "duration",
            Event::End => "end",
        }
    }
}

/// Hooks that record every callback in order.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(&self) -> Hooks {
        let push = |recorder: &Recorder| {
            let events = recorder.events.clone();
            move |event: Event| events.lock().unwrap().push(event)
        };

        let (start, exception, observed, cancel, finish, duration, end) = (
            push(self),
            push(self),
            push(self),
            push(self),
            push(self),
            push(self),
            push(self),
        );

        Hooks::silent()
            .with_on_main_start(move || start(Event::Start))
            .with_on_main_exception(move |f| exception(Event::Exception(f.to_string())))
            .with_on_shutdown_observed(move || observed(Event::ShutdownObserved))
            .with_on_cancel(move || cancel(Event::Cancel))
            .with_on_finish(move || finish(Event::Finish))
            .with_report_duration(move |secs| duration(Event::Duration(secs)))
            .with_on_main_end(move || end(Event::End))
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(Event::name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.names().into_iter().filter(|n| *n == name).count()
    }

    /// The single reported duration. Panics if there is not exactly one.
    pub fn duration(&self) -> f64 {
        let durations: Vec<f64> = self
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Duration(secs) => Some(secs),
                _ => None,
            })
            .collect();
        assert_eq!(durations.len(), 1, "expected exactly one duration report");
        durations[0]
    }
}

/// An async task that sleeps for `ms` milliseconds.
#[allow(dead_code)]
pub fn sleeping_task(ms: u64) -> MainTask {
    MainTask::future(sleep_ms(ms))
}

async fn sleep_ms(ms: u64) -> TaskResult {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Ok(())
}
