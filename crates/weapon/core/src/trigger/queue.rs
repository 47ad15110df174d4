use std::collections::VecDeque;

use crate::stack::{StackContribution, StackKind, fold};

/// One triggered stack: a modifier amount alive until `expires_at`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerInstance {
    pub amount: f32,
    pub expires_at: f32,
}

/// Time-bounded stack of trigger instances, oldest first.
///
/// Entries are pushed with non-decreasing expiry (every push uses the same
/// duration from a monotonic clock), so pruning only inspects the front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriggerQueue {
    entries: VecDeque<TriggerInstance>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instance: TriggerInstance) {
        self.entries.push_back(instance);
    }

    /// Pushes an instance expiring `duration` seconds after `now`.
    pub fn push_for(&mut self, amount: f32, now: f32, duration: f32) {
        self.push(TriggerInstance {
            amount,
            expires_at: now + duration.max(0.0),
        });
    }

    /// Drops every instance that expired strictly before `now`.
    pub fn prune(&mut self, now: f32) {
        while self
            .entries
            .front()
            .is_some_and(|entry| entry.expires_at < now)
        {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TriggerInstance> {
        self.entries.iter()
    }

    /// Prunes, then folds the surviving instances onto a neutral base of 1.
    ///
    /// `to_mod` maps a raw instance amount to its modifier value. Under `Add`
    /// each instance contributes its offset from 1; under `Multiply` instances
    /// multiply; `Override` and `None` keep only the newest instance. Returns
    /// `None` when nothing is alive.
    pub fn fold(
        &mut self,
        now: f32,
        stacking: StackKind,
        to_mod: impl Fn(f32) -> f32,
    ) -> Option<f32> {
        self.prune(now);
        if self.entries.is_empty() {
            return None;
        }

        let contributions: Vec<StackContribution> = self
            .entries
            .iter()
            .map(|entry| {
                let modifier = to_mod(entry.amount);
                match stacking {
                    StackKind::Add => StackContribution::new(modifier - 1.0, StackKind::Add, 0),
                    StackKind::Multiply => StackContribution::new(modifier, StackKind::Multiply, 0),
                    StackKind::Override | StackKind::None => {
                        StackContribution::new(modifier, StackKind::Override, 0)
                    }
                }
            })
            .collect();

        Some(fold(1.0, &contributions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(amount: f32) -> f32 {
        amount
    }

    #[test]
    fn prune_removes_only_expired_entries() {
        let mut queue = TriggerQueue::new();
        queue.push(TriggerInstance {
            amount: 1.0,
            expires_at: 5.0,
        });
        queue.push(TriggerInstance {
            amount: 2.0,
            expires_at: 10.0,
        });

        let value = queue.fold(7.0, StackKind::Multiply, identity);
        assert_eq!(value, Some(2.0));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.iter().next().map(|e| e.amount), Some(2.0));
    }

    #[test]
    fn entry_at_exact_expiry_survives() {
        let mut queue = TriggerQueue::new();
        queue.push_for(1.5, 0.0, 2.0);
        queue.prune(2.0);
        assert_eq!(queue.len(), 1);
        queue.prune(2.0001);
        assert!(queue.is_empty());
    }

    #[test]
    fn stacking_modes_combine_instances() {
        let mut queue = TriggerQueue::new();
        queue.push_for(1.5, 0.0, 10.0);
        queue.push_for(2.0, 0.0, 10.0);

        assert_eq!(queue.clone().fold(1.0, StackKind::Add, identity), Some(2.5));
        assert_eq!(
            queue.clone().fold(1.0, StackKind::Multiply, identity),
            Some(3.0)
        );
        assert_eq!(
            queue.clone().fold(1.0, StackKind::Override, identity),
            Some(2.0)
        );
        assert_eq!(queue.fold(1.0, StackKind::None, identity), Some(2.0));
    }

    #[test]
    fn empty_queue_folds_to_none() {
        let mut queue = TriggerQueue::new();
        assert_eq!(queue.fold(0.0, StackKind::Add, identity), None);
        queue.push_for(3.0, 0.0, 1.0);
        assert_eq!(queue.fold(5.0, StackKind::Add, identity), None);
    }

    #[test]
    fn negative_duration_is_clamped() {
        let mut queue = TriggerQueue::new();
        queue.push_for(1.0, 4.0, -3.0);
        assert_eq!(queue.iter().next().map(|e| e.expires_at), Some(4.0));
    }
}
