use crate::config::SolverType;

/// Adaptive solver controller.
///
/// Monitors step times and recommends a solver mode that keeps the kernel
/// within a frame budget. While the preferred mode is `Sph` and the smoothed
/// step time exceeds the budget, it falls back to `SphEstimate`. After a
/// sustained run under budget the full solver is restored. Any other
/// preferred mode is passed through untouched.
pub struct AdaptiveSolver {
    /// Target step budget in milliseconds (default: 8.0ms for 60fps with headroom).
    pub budget_ms: f32,
    /// Whether adaptation is enabled.
    pub enabled: bool,
    /// Mode requested by the caller.
    preferred: SolverType,
    /// Whether the cheaper estimate is currently in effect.
    degraded: bool,
    /// Exponential moving average of step time.
    ema_ms: f32,
    /// Number of consecutive frames well under budget (for restoration).
    frames_under_budget: u32,
}

impl AdaptiveSolver {
    pub fn new(preferred: SolverType) -> Self {
        Self {
            budget_ms: 8.0,
            enabled: false,
            preferred,
            degraded: false,
            ema_ms: 0.0,
            frames_under_budget: 0,
        }
    }

    pub fn set_preferred(&mut self, preferred: SolverType) {
        self.preferred = preferred;
        self.degraded = false;
        self.frames_under_budget = 0;
    }

    /// Current recommended solver mode.
    pub fn solver(&self) -> SolverType {
        if self.enabled && self.degraded && self.preferred == SolverType::Sph {
            SolverType::SphEstimate
        } else {
            self.preferred
        }
    }

    /// Update the controller with the latest measured step time.
    pub fn update(&mut self, step_ms: f32) {
        if !self.enabled {
            return;
        }

        // EMA with alpha=0.3 for responsiveness
        self.ema_ms = self.ema_ms * 0.7 + step_ms * 0.3;

        if self.ema_ms > self.budget_ms {
            self.frames_under_budget = 0;
            if !self.degraded {
                log::debug!(
                    "step time {:.2}ms over {:.2}ms budget, switching to SPH estimate",
                    self.ema_ms,
                    self.budget_ms
                );
                self.degraded = true;
            }
        } else if self.ema_ms < self.budget_ms * 0.6 {
            self.frames_under_budget += 1;

            // Wait 30 frames before restoring (avoid oscillation)
            if self.frames_under_budget > 30 && self.degraded {
                self.frames_under_budget = 0;
                self.degraded = false;
                log::debug!("step time back under budget, restoring full SPH");
            }
        } else {
            // In acceptable range: slowly count toward restoration
            self.frames_under_budget = self.frames_under_budget.saturating_add(1).min(15);
        }
    }
}

/// Timing and population statistics from a single step.
#[derive(Clone, Copy, Debug, Default)]
pub struct StepStats {
    /// Number of substeps executed.
    pub substeps: u32,
    /// Live particles after the step.
    pub particle_count: u32,
    /// Particles retired by lifetime during the step.
    pub retired: u32,
    /// Collider hit-enter events raised during the step.
    pub hit_events: u32,
    /// Solver mode the step ran with.
    pub solver: SolverType,
}
