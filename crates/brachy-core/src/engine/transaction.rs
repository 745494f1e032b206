use super::error::EngineError;
use crate::core::models::patient::Patient;

/// Runs `action` against `patient` and rolls the patient back to its pre-trial
/// snapshot unless the action returns `Ok(Some(_))`.
///
/// The rollback also happens when the action fails, so an `Err` never leaves a
/// partially applied trial behind.
pub fn trial<F, R>(patient: &mut Patient, action: F) -> Result<Option<R>, EngineError>
where
    F: FnOnce(&mut Patient) -> Result<Option<R>, EngineError>,
{
    let snapshot = patient.snapshot();

    match action(patient) {
        Ok(Some(value)) => Ok(Some(value)),
        Ok(None) => {
            patient.restore(snapshot);
            Ok(None)
        }
        Err(e) => {
            patient.restore(snapshot);
            Err(e)
        }
    }
}
