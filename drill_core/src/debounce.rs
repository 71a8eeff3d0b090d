//! Button debouncer and press classifier.
//!
//! Polled at loop cadence with the raw line level. An edge is accepted only
//! if it arrives at or after the guard deadline set by the previous accepted
//! edge; rejected edges are dropped, not queued. Presses are classified on
//! release by how long the button was held, so a press that is never
//! released produces nothing.

use drill_traits::ButtonLevel;
use tracing::{debug, trace};

use crate::config::ButtonCfg;

/// Direction of an accepted edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Down,
    Up,
}

impl ButtonEvent {
    fn from_level(level: ButtonLevel) -> Self {
        match level {
            ButtonLevel::Pressed => Self::Down,
            ButtonLevel::Released => Self::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressClass {
    Short,
    Long,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    cfg: ButtonCfg,
    last_level: ButtonLevel,
    down_at_ms: Option<u64>,
    guard_until_ms: u64,
}

impl Debouncer {
    pub fn new(cfg: ButtonCfg) -> Self {
        Self {
            cfg,
            last_level: ButtonLevel::Released,
            down_at_ms: None,
            guard_until_ms: 0,
        }
    }

    pub fn cfg(&self) -> &ButtonCfg {
        &self.cfg
    }

    /// Level seen by the last sample, accepted or not.
    pub fn last_level(&self) -> ButtonLevel {
        self.last_level
    }

    /// Timestamp of the accepted press still awaiting release.
    pub fn down_at_ms(&self) -> Option<u64> {
        self.down_at_ms
    }

    /// `> long_press_ms` is long; exactly the threshold is still short.
    pub fn classify(&self, held_ms: u64) -> PressClass {
        if held_ms > self.cfg.long_press_ms {
            PressClass::Long
        } else {
            PressClass::Short
        }
    }

    /// Feed one raw sample. Returns a classified press on an accepted release.
    pub fn on_level_sample(&mut self, level: ButtonLevel, now_ms: u64) -> Option<PressClass> {
        if level == self.last_level {
            return None;
        }
        // The line really did change; remember that even if the edge is dropped
        self.last_level = level;
        let edge = ButtonEvent::from_level(level);

        if now_ms < self.guard_until_ms {
            trace!(?edge, now_ms, guard_until_ms = self.guard_until_ms, "edge dropped (debounce)");
            return None;
        }
        self.guard_until_ms = now_ms.saturating_add(self.cfg.debounce_ms);

        match edge {
            ButtonEvent::Down => {
                debug!(now_ms, "button down");
                self.down_at_ms = Some(now_ms);
                None
            }
            ButtonEvent::Up => {
                let Some(down_at) = self.down_at_ms.take() else {
                    debug!(now_ms, "button up without recorded press; ignored");
                    return None;
                };
                let held_ms = now_ms.saturating_sub(down_at);
                let class = self.classify(held_ms);
                debug!(held_ms, ?class, "button up");
                Some(class)
            }
        }
    }
}
