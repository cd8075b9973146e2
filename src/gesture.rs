//! Horizontal swipe handling for the date feed.
//!
//! Direction convention: a finger travelling right (positive displacement) pulls the
//! previous day into view, so it retreats one day; travelling left advances one day.

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStep {
    Advance,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Net horizontal travel a completed gesture must exceed to change the day
    pub threshold: f32,
    /// Horizontal travel that turns a touch into a pan
    pub active_offset_x: f32,
    /// Vertical travel that fails a pan which is not active yet
    pub fail_offset_y: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: 50.0,
            active_offset_x: 10.0,
            fail_offset_y: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PanState {
    Idle,
    Began,
    Active,
    Failed,
}

pub struct GestureDateNavigator {
    config: SwipeConfig,
    state: PanState,
}

impl GestureDateNavigator {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            state: PanState::Idle,
        }
    }

    pub fn begin(&mut self) {
        self.state = PanState::Began;
    }

    /// Continuous drag signal with the translation since the gesture began
    pub fn drag(&mut self, dx: f32, dy: f32) {
        if self.state == PanState::Idle {
            // A drag without a begin is the start of a gesture
            self.state = PanState::Began;
        }

        if self.state != PanState::Began {
            return;
        }

        if dx.abs() > self.config.active_offset_x {
            trace!("Pan activated at dx={}", dx);
            self.state = PanState::Active;
        } else if dy.abs() > self.config.fail_offset_y {
            debug!("Pan failed on vertical travel dy={}", dy);
            self.state = PanState::Failed;
        }
    }

    /// Completes the gesture with its net horizontal displacement
    pub fn end(&mut self, dx: f32) -> Option<DayStep> {
        let state = std::mem::replace(&mut self.state, PanState::Idle);

        if state == PanState::Failed || state == PanState::Idle {
            return None;
        }

        if dx.is_nan() || dx.abs() <= self.config.threshold {
            trace!("Displacement {} within threshold, ignoring", dx);
            return None;
        }

        let step = if dx > 0.0 {
            DayStep::Retreat
        } else {
            DayStep::Advance
        };

        debug!("Swipe of {} -> {:?}", dx, step);

        Some(step)
    }

    /// Interrupted gestures never emit a step
    pub fn cancel(&mut self) {
        if self.state != PanState::Idle {
            debug!("Gesture cancelled");
        }

        self.state = PanState::Idle;
    }

    pub fn is_tracking(&self) -> bool {
        matches!(self.state, PanState::Began | PanState::Active)
    }
}

impl Default for GestureDateNavigator {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}
