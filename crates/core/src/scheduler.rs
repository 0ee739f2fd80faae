// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-tier cooperative task queue
//!
//! A tick drains the immediate tier to empty, then runs every batched task
//! that was queued before the batched phase began. Immediate work scheduled
//! by a batched task runs before the next batched task. Batched work queued
//! during the batched phase waits for the following tick.

use crate::config::SchedulerConfig;
use crate::error::ReactiveError;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

/// Scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Runs as soon as the current call stack unwinds
    Immediate,
    /// Runs once per tick, after all immediate work
    Batched,
}

/// What a single tick ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub immediate: usize,
    pub batched: usize,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.immediate == 0 && self.batched == 0
    }
}

#[derive(Default)]
struct Queues {
    immediate: VecDeque<Task>,
    batched: VecDeque<Task>,
}

impl Queues {
    fn tier(&mut self, tier: Tier) -> &mut VecDeque<Task> {
        match tier {
            Tier::Immediate => &mut self.immediate,
            Tier::Batched => &mut self.batched,
        }
    }
}

/// Shared handle to the task queue; clones drive the same queues
#[derive(Clone)]
pub struct TaskQueue {
    queues: Rc<RefCell<Queues>>,
    tick_limit: usize,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("immediate", &self.pending(Tier::Immediate))
            .field("batched", &self.pending(Tier::Batched))
            .field("tick_limit", &self.tick_limit)
            .finish()
    }
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::with_config(&SchedulerConfig::default())
    }

    pub fn with_config(config: &SchedulerConfig) -> Self {
        Self {
            queues: Rc::new(RefCell::new(Queues::default())),
            tick_limit: config.tick_limit,
        }
    }

    /// Queue a task on the given tier
    pub fn defer(&self, tier: Tier, task: impl FnOnce() + 'static) {
        self.queues.borrow_mut().tier(tier).push_back(Box::new(task));
    }

    pub fn defer_immediate(&self, task: impl FnOnce() + 'static) {
        self.defer(Tier::Immediate, task);
    }

    pub fn defer_batched(&self, task: impl FnOnce() + 'static) {
        self.defer(Tier::Batched, task);
    }

    /// Number of tasks waiting on a tier
    pub fn pending(&self, tier: Tier) -> usize {
        self.queues.borrow_mut().tier(tier).len()
    }

    pub fn is_idle(&self) -> bool {
        let queues = self.queues.borrow();
        queues.immediate.is_empty() && queues.batched.is_empty()
    }

    /// Run one tick of both tiers
    pub fn run_tick(&self) -> TickReport {
        let mut report = TickReport {
            immediate: self.drain_immediate(),
            batched: 0,
        };

        // Only tasks already queued belong to this tick
        let batch_len = self.pending(Tier::Batched);
        for _ in 0..batch_len {
            let Some(task) = self.pop(Tier::Batched) else {
                break;
            };
            task();
            report.batched += 1;
            report.immediate += self.drain_immediate();
        }

        report
    }

    /// Run ticks until both tiers are empty. Returns the number of ticks run.
    pub fn run_until_idle(&self) -> Result<usize, ReactiveError> {
        let mut ticks = 0;
        while !self.is_idle() {
            if ticks >= self.tick_limit {
                tracing::warn!(ticks, "task queue did not settle");
                return Err(ReactiveError::TickLimit(ticks));
            }
            self.run_tick();
            ticks += 1;
        }
        Ok(ticks)
    }

    fn drain_immediate(&self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.pop(Tier::Immediate) {
            task();
            ran += 1;
        }
        ran
    }

    // The borrow is released before the task runs so tasks can queue more work
    fn pop(&self, tier: Tier) -> Option<Task> {
        self.queues.borrow_mut().tier(tier).pop_front()
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
