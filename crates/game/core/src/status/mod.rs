//! Status-effect engine.
//!
//! All creation, refresh, and removal of status-effect instances flows
//! through this module so the stacking caps, the one-shot application
//! effects, and the tether mirroring stay in one place. The tether relation
//! is an explicit bidirectional table on [`GameState`] rather than references
//! embedded in instances, so a vanished partner can never dangle.

use std::collections::BTreeMap;

use tracing::warn;

use crate::combat::round_half_up;
use crate::env::{Attribute, CoreEnv, OracleError, Stacking, StatusKind};
use crate::state::{GameState, StatusEffectInstance, UnitId};

// ============================================================================
// Link Table
// ============================================================================

/// Bidirectional tether relation between units.
///
/// Both directions are stored; `link` and `unlink` keep them consistent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkTable {
    partners: BTreeMap<UnitId, UnitId>,
}

impl LinkTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Bonds two units. Any previous bond of either unit is dissolved first.
    pub fn link(&mut self, a: UnitId, b: UnitId) {
        self.unlink(a);
        self.unlink(b);
        self.partners.insert(a, b);
        self.partners.insert(b, a);
    }

    /// Dissolves the bond involving `unit`, if any.
    pub fn unlink(&mut self, unit: UnitId) {
        if let Some(partner) = self.partners.remove(&unit) {
            self.partners.remove(&partner);
        }
    }

    pub fn partner(&self, unit: UnitId) -> Option<UnitId> {
        self.partners.get(&unit).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

// ============================================================================
// Application & Removal
// ============================================================================

/// Applies a status effect to `target`.
///
/// Stackable kinds add a new instance until the stack cap; at the cap the
/// soonest-to-expire instance is refreshed instead. Unique kinds refresh the
/// existing instance. Any one-shot on-apply damage/heal authored on the
/// definition lands immediately.
///
/// `duration` overrides the definition default when set.
pub fn apply(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    target: UnitId,
    kind: StatusKind,
    duration: Option<u32>,
    source: Option<UnitId>,
) -> Result<(), OracleError> {
    let def = env.status_def(kind)?;
    let duration = duration.unwrap_or(def.duration);
    let (on_apply_damage, on_apply_heal) = (def.on_apply_damage, def.on_apply_heal);
    let stacking = def.stacking;
    let max_stacks = def.max_stacks();

    let Some(unit) = state.units.get_mut(target) else {
        warn!(%target, %kind, "status application on unknown unit skipped");
        return Ok(());
    };

    match stacking {
        Stacking::Unique => {
            if !unit.status_effects.refresh_first(kind, duration) {
                push_instance(unit, kind, duration, source);
            }
        }
        Stacking::Stackable { .. } => {
            if unit.status_effects.stacks_of(kind) >= max_stacks as usize {
                unit.status_effects.refresh_soonest(kind, duration);
            } else {
                push_instance(unit, kind, duration, source);
            }
        }
    }

    if on_apply_damage > 0 {
        unit.apply_damage(on_apply_damage);
    }
    if on_apply_heal > 0 {
        unit.apply_heal(on_apply_heal);
    }

    Ok(())
}

fn push_instance(
    unit: &mut crate::state::UnitState,
    kind: StatusKind,
    duration: u32,
    source: Option<UnitId>,
) {
    let pushed = unit.status_effects.push(StatusEffectInstance {
        kind,
        remaining: duration,
        source,
    });
    if !pushed {
        warn!(unit = %unit.id, %kind, "status collection full, application dropped");
    }
}

/// Removes the first instance of `kind` from `target`.
///
/// When the definition carries the link marker and the unit is tethered, the
/// removal mirrors onto the partner and the bond dissolves. A partner that no
/// longer exists degrades to a warning.
pub fn remove(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    target: UnitId,
    kind: StatusKind,
) -> Result<bool, OracleError> {
    let linked = env.status_def(kind)?.linked;

    let removed = match state.units.get_mut(target) {
        Some(unit) => unit.status_effects.remove_first(kind),
        None => false,
    };

    if removed && linked {
        if let Some(partner) = state.links.partner(target) {
            state.links.unlink(target);
            match state.units.get_mut(partner) {
                Some(unit) => {
                    unit.status_effects.remove_first(kind);
                }
                None => {
                    warn!(%target, %partner, %kind, "linked unit missing, mirror removal skipped");
                }
            }
        }
    }

    Ok(removed)
}

// ============================================================================
// Turn-End Tick
// ============================================================================

/// Applies periodic damage/heal and counts down every instance on `unit`.
///
/// Non-permanent instances decrement and are purged at zero. Must run exactly
/// once per turn boundary; only the phase machine's turn-resolution-end path
/// calls it.
pub fn turn_end_tick(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    unit_id: UnitId,
) -> Result<(), OracleError> {
    // Snapshot the per-kind tick behavior first; definitions are immutable
    // but the borrow of the unit below is exclusive.
    let mut plan: Vec<(StatusKind, u32, u32, bool)> = Vec::new();
    {
        let Some(unit) = state.units.get(unit_id) else {
            return Ok(());
        };
        for instance in unit.status_effects.iter() {
            let def = env.status_def(instance.kind)?;
            plan.push((instance.kind, def.tick_damage, def.tick_heal, def.permanent));
        }
    }

    let Some(unit) = state.units.get_mut(unit_id) else {
        return Ok(());
    };

    let mut damage = 0u32;
    let mut heal = 0u32;
    for (_, tick_damage, tick_heal, _) in &plan {
        damage += tick_damage;
        heal += tick_heal;
    }
    if damage > 0 {
        unit.apply_damage(damage);
    }
    if heal > 0 {
        unit.apply_heal(heal);
    }

    // Count down and purge. Permanent kinds never decrement.
    let permanent_kinds: Vec<StatusKind> = plan
        .iter()
        .filter(|(_, _, _, permanent)| *permanent)
        .map(|(kind, _, _, _)| *kind)
        .collect();
    for instance in unit.status_effects.iter_mut() {
        if !permanent_kinds.contains(&instance.kind) {
            instance.remaining = instance.remaining.saturating_sub(1);
        }
    }
    unit.status_effects
        .retain(|instance| permanent_kinds.contains(&instance.kind) || instance.remaining > 0);

    Ok(())
}

// ============================================================================
// Aggregated Modifiers
// ============================================================================

/// Aggregated modifier for `attribute` across the unit's active effects.
///
/// Dodge chance, critical chance, and critical damage sum their
/// contributions from a base of zero; every other attribute multiplies from a
/// base of one. The nearsight range offset is applied separately by
/// [`effective_range`].
pub fn stat_modifier(
    state: &GameState,
    env: &CoreEnv<'_>,
    unit_id: UnitId,
    attribute: Attribute,
) -> Result<f32, OracleError> {
    let mut additive = 0.0f32;
    let mut product = 1.0f32;

    if let Some(unit) = state.units.get(unit_id) {
        for instance in unit.status_effects.iter() {
            let def = env.status_def(instance.kind)?;
            for modifier in &def.modifiers {
                if modifier.attribute != attribute {
                    continue;
                }
                if attribute.is_additive() {
                    additive += modifier.value;
                } else {
                    product *= modifier.value;
                }
            }
        }
    }

    Ok(if attribute.is_additive() {
        additive
    } else {
        product
    })
}

/// Effective ability range for a caster: the multiplicative range aggregate
/// over `base` (cast range plus any zone bonus), then the flat nearsight
/// offset per stack, floored at zero.
pub fn effective_range(
    state: &GameState,
    env: &CoreEnv<'_>,
    unit_id: UnitId,
    base: u32,
) -> Result<u32, OracleError> {
    let multiplier = stat_modifier(state, env, unit_id, Attribute::AbilityRange)?;
    let scaled = round_half_up(base as f32 * multiplier) as i64;

    let penalty = env.config()?.rules().nearsight_penalty as i64;
    let stacks = state
        .units
        .get(unit_id)
        .map(|u| u.status_effects.stacks_of(StatusKind::Nearsighted))
        .unwrap_or(0) as i64;

    Ok((scaled + penalty * stacks).max(0) as u32)
}

// ============================================================================
// Action Gates
// ============================================================================

/// False while any Stun/Frozen instance is active.
pub fn can_act(state: &GameState, unit_id: UnitId) -> bool {
    state.units.get(unit_id).is_some_and(|unit| {
        !unit.status_effects.has(StatusKind::Stunned) && !unit.status_effects.has(StatusKind::Frozen)
    })
}

/// False while any Root/Stun/Frozen instance is active.
pub fn can_move(state: &GameState, unit_id: UnitId) -> bool {
    can_act(state, unit_id)
        && state
            .units
            .get(unit_id)
            .is_some_and(|unit| !unit.status_effects.has(StatusKind::Rooted))
}
