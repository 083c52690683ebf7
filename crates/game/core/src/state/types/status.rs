//! Status-effect instances attached to a unit.
//!
//! Instances are created, refreshed, and removed exclusively through
//! [`crate::status`]; this module only provides the bounded collection and
//! its local invariants. Durations count down in turns and are decremented
//! once per turn boundary by the turn-end tick.

use arrayvec::ArrayVec;

use crate::config::CoreConfig;
use crate::env::StatusKind;

use super::UnitId;

/// A single status-effect instance. Stackable effects hold one instance per
/// stack, so the per-kind instance count is the stack count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectInstance {
    pub kind: StatusKind,
    /// Turns left before the instance expires. Ignored for kinds whose
    /// definition is permanent.
    pub remaining: u32,
    /// Unit that applied the effect, when one exists (abilities, zones).
    pub source: Option<UnitId>,
}

/// Active status effects on a unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    instances: ArrayVec<StatusEffectInstance, { CoreConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self {
            instances: ArrayVec::new(),
        }
    }

    /// Checks if any instance of the given kind is present.
    pub fn has(&self, kind: StatusKind) -> bool {
        self.instances.iter().any(|e| e.kind == kind)
    }

    /// Number of instances of the given kind (the stack count).
    pub fn stacks_of(&self, kind: StatusKind) -> usize {
        self.instances.iter().filter(|e| e.kind == kind).count()
    }

    /// Adds a new instance. Returns false when the collection is full.
    pub fn push(&mut self, instance: StatusEffectInstance) -> bool {
        self.instances.try_push(instance).is_ok()
    }

    /// Extends the duration of the soonest-to-expire instance of `kind`.
    ///
    /// Used when a stackable effect is already at its stack cap. Returns
    /// false if no instance of the kind exists.
    pub fn refresh_soonest(&mut self, kind: StatusKind, duration: u32) -> bool {
        if let Some(instance) = self
            .instances
            .iter_mut()
            .filter(|e| e.kind == kind)
            .min_by_key(|e| e.remaining)
        {
            instance.remaining = instance.remaining.max(duration);
            true
        } else {
            false
        }
    }

    /// Extends the duration of the first instance of `kind`.
    ///
    /// Used for non-stackable re-application. Returns false if absent.
    pub fn refresh_first(&mut self, kind: StatusKind, duration: u32) -> bool {
        if let Some(instance) = self.instances.iter_mut().find(|e| e.kind == kind) {
            instance.remaining = instance.remaining.max(duration);
            true
        } else {
            false
        }
    }

    /// Removes the first instance of `kind`. Returns true if one was removed.
    pub fn remove_first(&mut self, kind: StatusKind) -> bool {
        if let Some(index) = self.instances.iter().position(|e| e.kind == kind) {
            self.instances.remove(index);
            true
        } else {
            false
        }
    }

    /// Removes every instance of `kind`.
    pub fn remove_all(&mut self, kind: StatusKind) {
        self.instances.retain(|e| e.kind != kind);
    }

    /// Keeps only the instances matching the predicate.
    pub fn retain(&mut self, mut f: impl FnMut(&StatusEffectInstance) -> bool) {
        self.instances.retain(|e| f(e));
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectInstance> {
        self.instances.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StatusEffectInstance> {
        self.instances.iter_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}
