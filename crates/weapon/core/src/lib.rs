//! Property dispatch and stacking engine for data-driven weapons.
//!
//! `weapon-core` assembles weapon behavior from small configured property
//! modules. Hosts construct a typed [`Context`] at the moment a gameplay event
//! happens and hand it to a per-weapon [`DispatchRegistry`], which delivers it
//! to every active subscriber in registration order. Query contexts carry
//! [`StackAccumulator`]s that modules refine through
//! [`StackAccumulator::add_contribution`]; the host reads the folded value
//! once dispatch returns.
//!
//! Everything here is synchronous and deterministic. Time comes from a
//! [`Clock`] supplied by the caller, and side effects a module wants the host
//! to perform are emitted as [`WeaponEffect`] requests rather than executed.
pub mod clock;
pub mod codec;
pub mod config;
pub mod context;
pub mod damage;
pub mod error;
pub mod property;
pub mod registry;
pub mod stack;
pub mod trigger;

pub use clock::{Clock, ManualClock};
pub use codec::{
    DocumentWriter, FieldValue, PROPERTY_KINDS, PropertyKindEntry, decode_list, decode_property,
    decode_trigger, encode_list, encode_property, encode_trigger, find_kind, normalize_key,
};
pub use config::EngineConfig;
pub use context::{
    ChargeContext, Context, ContextKind, ContextSet, DamageQuery, DamageableHitContext,
    HitContext, KillContext, StatQuery, TargetId, Vec3,
};
pub use damage::DamageType;
pub use error::{CodecError, RegistryError};
pub use property::{
    Accelerate, AmmoMod, AmmoRequest, AmmoResolution, AutoTrigger, DispatchCx, ExplosionOrigin,
    ExplosionRequest, ExplosionSettings, Explosive, PropertyList, ReceiverSlot, StatMod,
    StatTarget, SyncProperty, WeaponCategory, WeaponEffect, WeaponId, WeaponInfo, WeaponProperty,
};
pub use registry::{DispatchRegistry, MAX_SYNC_IDS, PropertyId};
pub use stack::{StackAccumulator, StackContribution, StackKind, fold};
pub use trigger::{
    TriggerCoordinator, TriggerDefinition, TriggerHit, TriggerInstance, TriggerName, TriggerQueue,
};
