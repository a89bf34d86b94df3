use crate::config::LayoutConfig;

/// Expand/collapse progress of one bundle.
///
/// Starts collapsed. Entering the bundle or any of its members expands it; leaving the last
/// hovered element schedules a collapse after a short delay, cancelled by re-entering.
/// `progress` eases toward the target over a fixed duration from wherever it currently is:
/// ease-out cubic while expanding, ease-in cubic while collapsing.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleState {
    hover_depth: u32,
    expanded: bool,
    progress: f32,
    collapse_in: Option<f32>,
    animation: Option<Animation>,
    duration: f32,
    collapse_delay: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Animation {
    from: f32,
    elapsed: f32,
}

impl Default for BundleState {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl BundleState {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            hover_depth: 0,
            expanded: false,
            progress: 0.0,
            collapse_in: None,
            animation: None,
            duration: config.bundle_expand_secs.max(0.0),
            collapse_delay: config.bundle_collapse_delay_secs.max(0.0),
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.collapse_in.is_some()
    }

    /// The count badge stays visible until the fan-out is nearly complete.
    pub fn shows_badge(&self) -> bool {
        self.progress < 0.99
    }

    pub fn shows_members(&self) -> bool {
        self.progress > 0.01
    }

    pub fn pointer_enter(&mut self) {
        self.hover_depth += 1;
        self.collapse_in = None;
        self.set_expanded(true);
    }

    pub fn pointer_leave(&mut self) {
        self.hover_depth = self.hover_depth.saturating_sub(1);
        if self.hover_depth == 0 && self.expanded {
            self.collapse_in = Some(self.collapse_delay);
        }
    }

    /// Collapse immediately, e.g. on a click outside the bundle.
    pub fn dismiss(&mut self) {
        self.hover_depth = 0;
        self.collapse_in = None;
        self.set_expanded(false);
    }

    /// Advances timers and easing by `dt` seconds.
    pub fn tick(&mut self, dt: f32) {
        let dt = dt.max(0.0);

        if let Some(remaining) = self.collapse_in {
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                self.collapse_in = None;
                if self.hover_depth == 0 {
                    self.set_expanded(false);
                }
            } else {
                self.collapse_in = Some(remaining);
            }
        }

        let Some(mut animation) = self.animation else {
            return;
        };

        animation.elapsed += dt;
        let linear = if self.duration > 0.0 {
            (animation.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        let (target, eased) = if self.expanded {
            (1.0, ease_out_cubic(linear))
        } else {
            (0.0, ease_in_cubic(linear))
        };
        self.progress = animation.from + (target - animation.from) * eased;

        if linear >= 1.0 {
            self.progress = target;
            self.animation = None;
        } else {
            self.animation = Some(animation);
        }
    }

    fn set_expanded(&mut self, expanded: bool) {
        if self.expanded == expanded {
            return;
        }
        self.expanded = expanded;
        self.animation = Some(Animation {
            from: self.progress,
            elapsed: 0.0,
        });
    }
}

fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in_cubic(t: f32) -> f32 {
    t * t * t
}
