//! Cooperative scheduler loop.
//!
//! Each iteration runs, in order: the timer check, one button sample, and a
//! POLL dispatch when the poll deadline has passed. Poll deadlines advance
//! by exactly one period per dispatch, so a stalled loop catches up one poll
//! per iteration instead of skipping.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use drill_traits::{Actuator, Button, Indicator, Knob};
use tracing::{debug, info};

use crate::controller::Controller;
use crate::error::Result;

pub struct Scheduler<K, B, I, A> {
    controller: Controller<K, B, I, A>,
    next_poll_ms: u64,
    iterations: u64,
    polls: u64,
}

impl<K, B, I, A> Scheduler<K, B, I, A>
where
    K: Knob,
    B: Button,
    I: Indicator,
    A: Actuator,
{
    pub fn new(controller: Controller<K, B, I, A>) -> Self {
        Self {
            controller,
            next_poll_ms: 0,
            iterations: 0,
            polls: 0,
        }
    }

    pub fn controller(&self) -> &Controller<K, B, I, A> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<K, B, I, A> {
        &mut self.controller
    }

    pub fn into_inner(self) -> Controller<K, B, I, A> {
        self.controller
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// One loop iteration. Initializes the controller on first use.
    pub fn step(&mut self) -> Result<()> {
        self.controller.initialize()?;
        self.controller.check_timer()?;
        self.controller.poll_button()?;

        let now = self.controller.now_ms();
        if now >= self.next_poll_ms {
            self.next_poll_ms = self
                .next_poll_ms
                .saturating_add(self.controller.control_cfg().poll_period_ms);
            self.polls += 1;
            self.controller.dispatch_poll()?;
        }
        self.iterations += 1;
        Ok(())
    }

    fn idle(&self) {
        let interval = Duration::from_millis(self.controller.control_cfg().loop_interval_ms);
        self.controller.clock().sleep(interval);
    }

    /// Loop until `shutdown` is set. Returns the first error from the core.
    pub fn run_until(&mut self, shutdown: &AtomicBool) -> Result<()> {
        info!(
            poll_period_ms = self.controller.control_cfg().poll_period_ms,
            loop_interval_ms = self.controller.control_cfg().loop_interval_ms,
            "scheduler started"
        );
        while !shutdown.load(Ordering::Relaxed) {
            self.step()?;
            self.idle();
        }
        debug!(iterations = self.iterations, polls = self.polls, "scheduler stopped");
        Ok(())
    }

    /// Loop for `duration_ms` of controller time, calling `before_step` with
    /// the current time ahead of each iteration (scripted inputs).
    pub fn run_for<F>(&mut self, duration_ms: u64, mut before_step: F) -> Result<()>
    where
        F: FnMut(u64),
    {
        let end = self.controller.now_ms().saturating_add(duration_ms);
        loop {
            let now = self.controller.now_ms();
            if now >= end {
                break;
            }
            before_step(now);
            self.step()?;
            self.idle();
        }
        Ok(())
    }
}
