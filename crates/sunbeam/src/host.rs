//! [`HostOps`] backed by the terminal runtime.
//!
//! Jobs run on named worker threads and report back as [`AppMessage`]s.
//! Hand-offs need the terminal, so they are queued here and run by the event
//! loop between frames.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};

use sunbeam_tui::RuntimeHandle;

use crate::jobs;
use crate::page::{AppMessage, Followup, HandOff, HostOps, Job, JobOutcome, PageId};

/// Hand-off waiting for the loop to release the terminal.
#[derive(Debug, Clone)]
pub struct PendingHandOff {
    pub target: PageId,
    pub request: HandOff,
    pub followup: Followup,
}

pub struct RuntimeHost {
    handle: RuntimeHandle<AppMessage>,
    hand_offs: VecDeque<PendingHandOff>,
}

impl RuntimeHost {
    pub fn new(handle: RuntimeHandle<AppMessage>) -> Self {
        Self {
            handle,
            hand_offs: VecDeque::new(),
        }
    }

    /// Oldest queued hand-off.
    pub fn take_hand_off(&mut self) -> Option<PendingHandOff> {
        self.hand_offs.pop_front()
    }

    pub fn has_hand_offs(&self) -> bool {
        !self.hand_offs.is_empty()
    }
}

impl HostOps for RuntimeHost {
    fn spawn(&mut self, target: PageId, job: Job) {
        if let Job::Debounce { query, delay } = job {
            let message = AppMessage {
                target,
                outcome: JobOutcome::Debounce { query },
            };
            if let Err(error) = self.handle.send_after("sunbeam-debounce", delay, message) {
                tracing::warn!(%error, "failed to start debounce timer");
            }
            return;
        }

        let name = format!("sunbeam-{}", job.name());
        let followup = job.followup();
        let spawned = self.handle.spawn_worker(&name, move || {
            let outcome = match catch_unwind(AssertUnwindSafe(|| jobs::execute(job))) {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::error!("worker panicked");
                    JobOutcome::Done {
                        result: Err("worker panicked".to_string()),
                        followup: Followup::default(),
                    }
                }
            };
            AppMessage { target, outcome }
        });
        if let Err(error) = spawned {
            tracing::warn!(%error, "failed to spawn worker");
            self.handle.send(AppMessage {
                target,
                outcome: JobOutcome::Done {
                    result: Err(format!("failed to spawn worker: {error}")),
                    followup,
                },
            });
        }
    }

    fn hand_off(&mut self, target: PageId, request: HandOff, followup: Followup) {
        self.hand_offs.push_back(PendingHandOff {
            target,
            request,
            followup,
        });
    }
}
