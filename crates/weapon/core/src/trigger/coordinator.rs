use crate::context::Context;
use crate::damage::DamageType;
use crate::trigger::TriggerDefinition;

/// Non-zero weight produced by one activation definition for one event.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerHit {
    pub amount: f32,
    pub source: Context,
}

/// A module's trigger configuration plus the per-pass collection state.
///
/// The registry feeds every trigger-bearing context of a dispatch pass through
/// [`collect`](Self::collect), then drains the pass with
/// [`take_pass`](Self::take_pass) and [`take_reset`](Self::take_reset).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerCoordinator {
    activate: Vec<TriggerDefinition>,
    reset: Vec<TriggerDefinition>,
    cooldown: f32,
    reset_delay: f32,

    next_allowed: f32,
    last_apply: Option<f32>,
    pending: Vec<TriggerHit>,
    reset_pending: bool,
}

impl TriggerCoordinator {
    pub fn new(activate: TriggerDefinition) -> Self {
        Self {
            activate: vec![activate],
            ..Self::default()
        }
    }

    pub fn from_parts(activate: Vec<TriggerDefinition>, reset: Vec<TriggerDefinition>) -> Self {
        Self {
            activate,
            reset,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_reset(mut self, reset: TriggerDefinition) -> Self {
        self.reset.push(reset);
        self
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown.max(0.0);
        self
    }

    #[must_use]
    pub fn with_reset_delay(mut self, reset_delay: f32) -> Self {
        self.reset_delay = reset_delay.max(0.0);
        self
    }

    pub fn activate(&self) -> &[TriggerDefinition] {
        &self.activate
    }

    pub fn reset(&self) -> &[TriggerDefinition] {
        &self.reset
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    pub fn reset_delay(&self) -> f32 {
        self.reset_delay
    }

    pub fn set_cooldown(&mut self, cooldown: f32) {
        self.cooldown = cooldown.max(0.0);
    }

    pub fn set_reset_delay(&mut self, reset_delay: f32) {
        self.reset_delay = reset_delay.max(0.0);
    }

    pub fn push_activate(&mut self, definition: TriggerDefinition) {
        self.activate.push(definition);
    }

    pub fn push_reset(&mut self, definition: TriggerDefinition) {
        self.reset.push(definition);
    }

    /// True when the only configuration is a single activation definition.
    pub fn is_simple(&self) -> bool {
        self.activate.len() == 1
            && self.reset.is_empty()
            && self.cooldown == 0.0
            && self.reset_delay == 0.0
    }

    /// Excludes `mask` from every activation definition.
    pub fn add_blacklist(&mut self, mask: DamageType) {
        for definition in &mut self.activate {
            definition.add_blacklist(mask);
        }
    }

    /// Evaluates `context` against every definition and records the results.
    pub fn collect(&mut self, context: &Context) {
        if context.trigger_name().is_none() {
            return;
        }

        for definition in &self.activate {
            let amount = definition.evaluate(context);
            if amount != 0.0 {
                self.pending.push(TriggerHit {
                    amount,
                    source: context.clone(),
                });
            }
        }

        if self.reset.iter().any(|d| d.evaluate(context) != 0.0) {
            self.reset_pending = true;
        }
    }

    /// Returns the hits collected this pass, or nothing while on cooldown.
    pub fn take_pass(&mut self, now: f32) -> Vec<TriggerHit> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        if now < self.next_allowed {
            self.pending.clear();
            return Vec::new();
        }

        self.next_allowed = now + self.cooldown;
        self.last_apply = Some(now);
        std::mem::take(&mut self.pending)
    }

    /// Returns whether a reset definition fired this pass.
    pub fn take_reset(&mut self) -> bool {
        let fired = std::mem::take(&mut self.reset_pending);
        if fired {
            self.last_apply = None;
        }
        fired
    }

    /// True once `reset_delay` has elapsed since the last apply. Fires once.
    pub fn reset_due(&mut self, now: f32) -> bool {
        if self.reset_delay <= 0.0 {
            return false;
        }
        match self.last_apply {
            Some(at) if now - at >= self.reset_delay => {
                self.last_apply = None;
                true
            }
            _ => false,
        }
    }

    /// Same configuration, fresh collection state.
    pub fn clone_config(&self) -> Self {
        Self::from_parts(self.activate.clone(), self.reset.clone())
            .with_cooldown(self.cooldown)
            .with_reset_delay(self.reset_delay)
    }

    pub fn clear_state(&mut self) {
        self.next_allowed = 0.0;
        self.last_apply = None;
        self.pending.clear();
        self.reset_pending = false;
    }
}
