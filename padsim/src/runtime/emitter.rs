use std::error::Error;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use super::events::{EmitterCommand, EmitterCommandReceiver};
use crate::core::prelude::*;
use crate::sim::{Entity, MetricDocument};

/// Destination for metric documents. Failures are reported back to the
/// [`Emitter`], which logs them and carries on; there are no retries.
pub trait DocumentSink: Send {
    fn write(&mut self, document: &MetricDocument) -> Result<(), Box<dyn Error>>;
}

/// Collects documents in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub documents: Vec<MetricDocument>,
}

impl DocumentSink for VecSink {
    fn write(&mut self, document: &MetricDocument) -> Result<(), Box<dyn Error>> {
        self.documents.push(document.clone());
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickReport {
    pub written: usize,
    pub failed: usize,
}

/// Periodically samples every entity and hands the documents to a sink.
pub struct Emitter<S: DocumentSink> {
    entities: Vec<Entity>,
    sink: S,
    ticks: u64,
    docs_written: u64,
    failures: u64,
}

impl<S: DocumentSink> Emitter<S> {
    pub fn new(entities: Vec<Entity>, sink: S) -> Self {
        Self {
            entities,
            sink,
            ticks: 0,
            docs_written: 0,
            failures: 0,
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn docs_written(&self) -> u64 {
        self.docs_written
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// One document per entity, in entity order.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        for entity in &self.entities {
            let document = entity.next_document();
            match self.sink.write(&document) {
                Ok(()) => {
                    report.written += 1;
                    self.docs_written += 1;
                }
                Err(err) => {
                    report.failed += 1;
                    self.failures += 1;
                    error!(
                        "Error writing document for {}: {}",
                        document.entity, err
                    );
                }
            }
        }

        self.ticks += 1;
        report
    }

    /// `host-1: c:0.25   host-2: c:0.01   docs: 12`
    pub fn status_line(&self) -> String {
        let mut statuses: Vec<String> =
            self.entities.iter().map(Entity::status).collect();
        statuses.push(format!("docs: {}", self.docs_written));
        statuses.join("   ")
    }

    /// Tick immediately, then every `interval` until [`EmitterCommand::Quit`]
    /// arrives, the sender hangs up, or `after_tick` returns `false`.
    pub fn run<F>(
        &mut self,
        interval: Duration,
        commands: &EmitterCommandReceiver,
        mut after_tick: F,
    ) where
        F: FnMut(&Self, TickReport) -> bool,
    {
        info!(
            "Emitting {} documents every {:?}",
            self.entities.len(),
            interval
        );

        loop {
            let report = self.tick();
            if !after_tick(self, report) {
                break;
            }

            match commands.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(EmitterCommand::Quit) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Command channel closed");
                    break;
                }
            }
        }

        info!(
            "Emitter stopped after {} ticks; {} documents written, {} failed",
            self.ticks, self.docs_written, self.failures
        );
    }
}
