use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop.
#[derive(Clone, Debug)]
pub enum TrainerEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of input and tick events.
pub trait EventSource {
    /// Block until the next event. `None` means the source is exhausted.
    fn next(&self) -> Option<TrainerEvent>;
}

/// Production source: one thread polls crossterm input, another emits the
/// countdown tick at a fixed interval. Both feed a single channel so the app
/// loop stays strictly sequential.
pub struct TerminalEventSource {
    rx: Receiver<TrainerEvent>,
}

impl TerminalEventSource {
    pub fn new(tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let tick_tx = tx.clone();
        thread::spawn(move || loop {
            thread::sleep(tick_interval);
            if tick_tx.send(TrainerEvent::Tick).is_err() {
                break;
            }
        });

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(TrainerEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(TrainerEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl EventSource for TerminalEventSource {
    fn next(&self) -> Option<TrainerEvent> {
        self.rx.recv().ok()
    }
}

/// Scripted event source for headless tests.
pub struct TestEventSource {
    rx: Receiver<TrainerEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TrainerEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn next(&self) -> Option<TrainerEvent> {
        self.rx.recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_passes_events_through_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(TrainerEvent::Resize).unwrap();
        tx.send(TrainerEvent::Tick).unwrap();
        drop(tx);
        let source = TestEventSource::new(rx);

        match source.next() {
            Some(TrainerEvent::Resize) => {}
            other => panic!("expected Resize, got {other:?}"),
        }
        match source.next() {
            Some(TrainerEvent::Tick) => {}
            other => panic!("expected Tick, got {other:?}"),
        }
        assert!(source.next().is_none());
    }
}
