//! Survival-window derivation and the pre-dispatch triage gate.

use casevac_core::{Acuity, Patient};

use crate::decision::ReasoningCode;

/// Minutes between `now` and the predicted death timestamp, floored at
/// zero. `None` means the patient carries no hard deadline.
pub fn survival_window_minutes(patient: &Patient, now_epoch_secs: f64) -> Option<f64> {
    patient
        .predicted_death_epoch_secs
        .map(|t| ((t - now_epoch_secs) / 60.0).max(0.0))
}

/// Outcome of the pre-dispatch gate.
#[derive(Debug, Clone, PartialEq)]
pub enum TriageGate {
    /// Viable for routing; carries the derived survival window.
    Proceed {
        survival_window_minutes: Option<f64>,
    },
    /// Routing is pointless or impossible before any facility is scored.
    Forfeit(ReasoningCode),
}

/// Classify a patient before any optimization runs.
///
/// Checks are ordered: death flags first, then an expired window, then a
/// missing location. The first failing check wins.
pub fn triage_gate(patient: &Patient, now_epoch_secs: f64) -> TriageGate {
    if patient.deceased || patient.acuity == Acuity::Dead {
        return TriageGate::Forfeit(ReasoningCode::PatientDeceased);
    }

    let window = survival_window_minutes(patient, now_epoch_secs);
    if let Some(w) = window {
        if w <= 0.0 {
            return TriageGate::Forfeit(ReasoningCode::PatientDeceased);
        }
    }

    if patient.location.is_none() {
        return TriageGate::Forfeit(ReasoningCode::NoLocation);
    }

    TriageGate::Proceed {
        survival_window_minutes: window,
    }
}
