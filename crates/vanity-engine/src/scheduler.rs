//! Cooperative tick scheduler for deferred attachment work.
//!
//! Deferred work is represented as data, not closures, and executed by the
//! engine driver on the game-simulation thread. The short fixed delays act
//! as a debounce: same-tick side effects (entity removal, inventory writes)
//! settle before the equipment source-of-truth is re-read.

use uuid::Uuid;
use vanity_world::AuxId;

/// A one-shot task scheduled a fixed number of ticks ahead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduledTask {
    /// Re-attach a back accessory if the equipment still reports one.
    RestoreBackAccessory(Uuid),
    /// Re-attach a balloon if the equipment still reports one.
    RestoreBalloon(Uuid),
    /// Second stage of balloon creation: spawn and leash the tether anchor.
    LinkBalloonAnchor {
        player: Uuid,
        balloon: AuxId,
        height_bits: u32,
    },
    /// Re-apply a hat camera overlay from the helmet slot.
    RestoreHatOverlay(Uuid),
    /// Clear stray lead drops and knots around a player.
    CleanupStrayLeads(Uuid),
}

impl ScheduledTask {
    /// Pack a balloon float height into the link task (stored as bits so the
    /// task stays `Eq`-comparable).
    pub fn link_anchor(player: Uuid, balloon: AuxId, height: f32) -> Self {
        ScheduledTask::LinkBalloonAnchor {
            player,
            balloon,
            height_bits: height.to_bits(),
        }
    }
}

/// One-shot tasks ordered by due tick, FIFO within a tick.
#[derive(Debug, Default)]
pub struct TickScheduler {
    queue: Vec<Entry>,
    seq: u64,
}

#[derive(Debug)]
struct Entry {
    due: u64,
    seq: u64,
    task: ScheduledTask,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to run `delay` ticks after `now`.
    pub fn schedule(&mut self, now: u64, delay: u64, task: ScheduledTask) {
        self.queue.push(Entry {
            due: now + delay,
            seq: self.seq,
            task,
        });
        self.seq += 1;
    }

    /// Remove and return every task due at or before `now`, in submission
    /// order. Each task is returned exactly once.
    pub fn due(&mut self, now: u64) -> Vec<ScheduledTask> {
        let mut ready: Vec<Entry> = Vec::new();
        let mut rest: Vec<Entry> = Vec::new();
        for entry in self.queue.drain(..) {
            if entry.due <= now {
                ready.push(entry);
            } else {
                rest.push(entry);
            }
        }
        self.queue = rest;
        ready.sort_by_key(|e| e.seq);
        ready.into_iter().map(|e| e.task).collect()
    }

    /// Drop all pending tasks (shutdown).
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}
