use crate::codec::{DocumentWriter, FieldValue};
use crate::context::{Context, ContextSet};
use crate::property::{DispatchCx, WeaponCategory, WeaponEffect, WeaponProperty};

/// Makes a semi-automatic gun fire while the trigger is held.
///
/// Caches the weapon's flag on setup and restores it on clear.
#[derive(Debug, Default)]
pub struct AutoTrigger {
    cached: Option<bool>,
}

impl WeaponProperty for AutoTrigger {
    fn kind(&self) -> &'static str {
        "AutoTrigger"
    }

    fn contexts(&self) -> ContextSet {
        ContextSet::SETUP | ContextSet::CLEAR
    }

    fn invoke(&mut self, context: &mut Context, cx: &mut DispatchCx<'_>) {
        match context {
            Context::Setup => {
                self.cached = Some(cx.weapon().trigger_needs_press);
                cx.emit(WeaponEffect::TriggerNeedsPress(false));
            }
            Context::Clear => {
                if let Some(needs_press) = self.cached.take() {
                    cx.emit(WeaponEffect::TriggerNeedsPress(needs_press));
                }
            }
            _ => {}
        }
    }

    fn set_field(&mut self, _key: &str, _value: &FieldValue<'_>) {}

    fn encode(&self, _out: &mut DocumentWriter) {}

    fn clone_template(&self) -> Box<dyn WeaponProperty> {
        Box::new(Self::default())
    }

    fn reset_state(&mut self) {
        self.cached = None;
    }

    fn supports(&self, category: WeaponCategory) -> bool {
        category == WeaponCategory::Gun
    }
}
