//! Aura debit strategies.
//!
//! The pipeline validates affordability itself; *how* the debit lands is a
//! strategy. Offline matches mutate the pool in place. Under an
//! authoritative server the core records a command for the host to submit
//! instead of mutating locally, and the server's response drives the real
//! pool.

use crate::state::{GameState, UnitId};

use super::AbilityError;

/// Strategy seam for the resource-debit step of the pipeline.
pub trait AuraLedger {
    fn debit(
        &mut self,
        state: &mut GameState,
        unit: UnitId,
        amount: u32,
    ) -> Result<(), AbilityError>;
}

/// Offline mode: debits the unit's aura pool directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalLedger;

impl AuraLedger for LocalLedger {
    fn debit(
        &mut self,
        state: &mut GameState,
        unit: UnitId,
        amount: u32,
    ) -> Result<(), AbilityError> {
        let unit = state
            .units
            .get_mut(unit)
            .ok_or(AbilityError::SourceNotFound)?;
        if unit.aura.current < amount {
            return Err(AbilityError::InsufficientAura);
        }
        unit.aura.spend(amount);
        Ok(())
    }
}

/// A debit recorded for an authoritative collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraCommand {
    pub unit: UnitId,
    pub amount: u32,
}

/// Networked mode: leaves the local pool untouched and queues one
/// [`AuraCommand`] per debit for the host to submit upstream.
#[derive(Clone, Debug, Default)]
pub struct DeferredLedger {
    pub queued: Vec<AuraCommand>,
}

impl DeferredLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains the recorded commands for submission.
    pub fn drain(&mut self) -> Vec<AuraCommand> {
        std::mem::take(&mut self.queued)
    }
}

impl AuraLedger for DeferredLedger {
    fn debit(
        &mut self,
        _state: &mut GameState,
        unit: UnitId,
        amount: u32,
    ) -> Result<(), AbilityError> {
        self.queued.push(AuraCommand { unit, amount });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::duel_state;

    #[test]
    fn local_ledger_debits_in_place() {
        let mut state = duel_state();
        let mut ledger = LocalLedger;
        ledger.debit(&mut state, UnitId(1), 3).unwrap();
        assert_eq!(state.unit(UnitId(1)).unwrap().aura.current, 2);

        assert_eq!(
            ledger.debit(&mut state, UnitId(1), 3),
            Err(AbilityError::InsufficientAura)
        );
    }

    #[test]
    fn deferred_ledger_records_without_mutating() {
        let mut state = duel_state();
        let mut ledger = DeferredLedger::new();
        ledger.debit(&mut state, UnitId(1), 3).unwrap();

        assert_eq!(state.unit(UnitId(1)).unwrap().aura.current, 5);
        assert_eq!(
            ledger.drain(),
            vec![AuraCommand {
                unit: UnitId(1),
                amount: 3
            }]
        );
    }
}
