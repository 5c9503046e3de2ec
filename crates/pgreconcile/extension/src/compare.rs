//! Desired/observed comparison and late initialization.

use pgreconcile_types::{ExtensionObservation, ExtensionParameters};

/// Whether the live extension already matches the desired parameters.
///
/// Structural equality over the comparable fields only; `template` is
/// create-only and has no live counterpart, so it never participates. An
/// unset desired version against a concrete observed one compares as not
/// up to date (the orchestrator resolves that through late initialization
/// before this verdict matters).
pub fn up_to_date(observed: &ExtensionObservation, desired: &ExtensionParameters) -> bool {
    observed.extension == desired.extension && observed.version == desired.version
}

/// Fill unset desired fields from the observed state.
///
/// Returns true iff at least one field was filled. Fields the user set
/// explicitly are never overwritten: desired state stays authoritative.
/// This is the only mutation in the core, and it must run before
/// [`up_to_date`] within an observe cycle so the verdict reflects the
/// merged desired state.
pub fn late_init(observed: &ExtensionObservation, desired: &mut ExtensionParameters) -> bool {
    let mut filled = false;

    if desired.extension.is_empty() {
        desired.extension = observed.extension.clone();
        filled = true;
    }

    if desired.version.is_none() {
        desired.version = observed.version.clone();
        filled = true;
    }

    filled
}
