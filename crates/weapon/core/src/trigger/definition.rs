use crate::codec::FieldValue;
use crate::context::Context;
use crate::damage::DamageType;
use crate::trigger::TriggerName;

/// Filter plus weight function over a single trigger kind.
///
/// # Evaluation
///
/// ```text
/// weight = 0                                   if kind differs
///        = 0                                   if tag ∩ blacklist ≠ ∅
///        = 0                                   if mask ≠ ∅ and tag ∩ mask = ∅
///        = min(magnitude × amount, cap)        if cap > 0
///        = magnitude × amount                  otherwise
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerDefinition {
    name: TriggerName,
    amount: f32,
    damage_type: DamageType,
    blacklist: DamageType,
    cap: f32,
}

impl TriggerDefinition {
    pub fn new(name: TriggerName) -> Self {
        Self {
            name,
            amount: 1.0,
            damage_type: name.default_damage_type(),
            blacklist: DamageType::empty(),
            cap: 0.0,
        }
    }

    #[must_use]
    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_damage_type(mut self, mask: DamageType) -> Self {
        self.damage_type = mask;
        self
    }

    #[must_use]
    pub fn with_blacklist(mut self, mask: DamageType) -> Self {
        self.blacklist = mask;
        self
    }

    #[must_use]
    pub fn with_cap(mut self, cap: f32) -> Self {
        self.cap = cap;
        self
    }

    pub fn name(&self) -> TriggerName {
        self.name
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    pub fn blacklist(&self) -> DamageType {
        self.blacklist
    }

    pub fn cap(&self) -> f32 {
        self.cap
    }

    pub(crate) fn add_blacklist(&mut self, mask: DamageType) {
        self.blacklist |= mask;
    }

    /// Weight of `context` under this definition; 0 means "does not apply".
    pub fn evaluate(&self, context: &Context) -> f32 {
        if context.trigger_name() != Some(self.name) {
            return 0.0;
        }

        let tag = context.damage_type();
        if tag.intersects(self.blacklist) {
            return 0.0;
        }
        if !self.damage_type.is_empty() && !tag.intersects(self.damage_type) {
            return 0.0;
        }

        let weight = context.trigger_magnitude() * self.amount;
        if self.cap > 0.0 {
            weight.min(self.cap)
        } else {
            weight
        }
    }

    /// Applies one normalized configuration key. Unknown keys are ignored.
    pub fn set_field(&mut self, key: &str, value: &FieldValue<'_>) {
        match key {
            "triggertype" | "trigger" | "type" | "name" => {
                if let Some((name, tags)) = value.as_str().and_then(TriggerName::parse) {
                    self.name = name;
                    self.damage_type |= tags;
                }
            }
            "amount" | "mod" | "multiplier" | "multi" => {
                if let Some(amount) = value.as_f32() {
                    self.amount = amount;
                }
            }
            "damagetype" | "damagetypes" | "mask" => {
                if let Some(mask) = value.as_mask() {
                    self.damage_type |= mask;
                }
            }
            "blacklist" | "blacklisttype" | "blacklistdamagetype" => {
                if let Some(mask) = value.as_mask() {
                    self.blacklist |= mask;
                }
            }
            "cap" | "max" => {
                if let Some(cap) = value.as_f32() {
                    self.cap = cap;
                }
            }
            _ => {}
        }
    }
}
