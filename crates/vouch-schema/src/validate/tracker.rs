//! Outcome tracking for `oneOf` attribution
//!
//! The tracker is the report sink shared by every candidate of one `oneOf`
//! evaluation. It keeps the failures of the candidate in progress and, across
//! all candidates, the set of referenced definitions that produced at least
//! one failure. A referenced definition that never failed is the one the
//! instance matched.
//!
//! Failures inside a nested `allOf`, `anyOf`, `not` or `oneOf` that passed as
//! a whole are handed over with `record_identity`. They mark exactly the
//! pointers they name and never fail the candidate.

use vouch_value::JsonPointer;

use crate::refs::ReferenceSet;

use super::context::ProcessingReport;
use super::error::{AmbiguousAttribution, ValidationError};

#[derive(Debug, Clone, Default)]
pub struct OutcomeTracker {
    referenced: ReferenceSet,
    /// Never cleared between candidates.
    errored: ReferenceSet,
    /// Identities handed over by nested trials.
    nested: ReferenceSet,
    current: Vec<ValidationError>,
}

impl OutcomeTracker {
    pub fn new(referenced: ReferenceSet) -> Self {
        Self {
            referenced,
            errored: ReferenceSet::default(),
            nested: ReferenceSet::default(),
            current: Vec::new(),
        }
    }

    pub fn referenced(&self) -> &ReferenceSet {
        &self.referenced
    }

    pub fn errored(&self) -> &ReferenceSet {
        &self.errored
    }

    pub fn nested_identities(&self) -> &ReferenceSet {
        &self.nested
    }

    /// Mark `identity`, and every referenced definition enclosing it, as failed.
    pub fn record_failure(&mut self, identity: &JsonPointer) {
        self.errored.insert(identity.clone());
        for reference in &self.referenced {
            if reference.encloses(identity) && !self.errored.contains(reference) {
                self.errored.insert(reference.clone());
            }
        }
    }

    // Composition failures keep their sub-schema failures private; those
    // still count against whatever definitions raised them.
    fn record_error(&mut self, error: &ValidationError) {
        for identity in error.source_identities() {
            self.record_failure(identity);
        }
    }

    /// Start collecting the failures of the next candidate.
    pub fn begin_candidate(&mut self) {
        self.current.clear();
    }

    /// Whether the candidate in progress has logged no failure.
    pub fn success_flag(&self) -> bool {
        self.current.is_empty()
    }

    /// Failures of the candidate in progress.
    pub fn take_candidate_report(&mut self) -> Vec<ValidationError> {
        core::mem::take(&mut self.current)
    }

    /// The single referenced definition that was never the source of a failure.
    pub fn derive_matching(&self) -> Result<Option<JsonPointer>, AmbiguousAttribution> {
        let mut survivors: Vec<JsonPointer> = self
            .referenced
            .iter()
            .filter(|reference| !self.errored.contains(*reference))
            .cloned()
            .collect();
        match survivors.len() {
            0 => Ok(None),
            1 => Ok(survivors.pop()),
            _ => Err(AmbiguousAttribution { survivors }),
        }
    }
}

impl ProcessingReport for OutcomeTracker {
    fn log(&mut self, error: ValidationError) {
        self.record_error(&error);
        self.current.push(error);
    }

    fn is_success(&self) -> bool {
        self.success_flag()
    }

    // The enclosing branch passed, so only the named pointer failed; no
    // enclosing definition is marked.
    fn record_identity(&mut self, identity: &JsonPointer) {
        self.errored.insert(identity.clone());
        self.nested.insert(identity.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::context::ValidationData;
    use crate::validate::error::ValidationErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn pointer(s: &str) -> JsonPointer {
        JsonPointer::parse(s).unwrap()
    }

    fn referenced(pointers: &[&str]) -> ReferenceSet {
        pointers.iter().map(|p| pointer(p)).collect()
    }

    #[test]
    fn test_single_survivor_is_matching() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/B"]));
        tracker.record_failure(&pointer("/definitions/A"));
        assert_eq!(tracker.derive_matching(), Ok(Some(pointer("/definitions/B"))));
    }

    #[test]
    fn test_no_survivor() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A"]));
        tracker.record_failure(&pointer("/definitions/A"));
        assert_eq!(tracker.derive_matching(), Ok(None));
    }

    #[test]
    fn test_no_references() {
        let tracker = OutcomeTracker::new(ReferenceSet::default());
        assert_eq!(tracker.derive_matching(), Ok(None));
    }

    #[test]
    fn test_two_survivors_are_ambiguous() {
        let tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/B"]));
        assert_eq!(
            tracker.derive_matching(),
            Err(AmbiguousAttribution {
                survivors: vec![pointer("/definitions/A"), pointer("/definitions/B")],
            })
        );
    }

    #[test]
    fn test_failure_below_definition_marks_it() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/AB"]));
        tracker.record_failure(&pointer("/definitions/A/properties/kind"));
        assert!(tracker.errored().contains(&pointer("/definitions/A")));
        assert!(!tracker.errored().contains(&pointer("/definitions/AB")));
    }

    #[test]
    fn test_record_failure_is_idempotent() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A"]));
        tracker.record_failure(&pointer("/definitions/A"));
        tracker.record_failure(&pointer("/definitions/A"));
        assert_eq!(tracker.errored().len(), 1);
    }

    #[test]
    fn test_errored_survives_begin_candidate() {
        let instance = json!("x");
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/B"]));

        tracker.begin_candidate();
        let data = ValidationData::new(&instance).through_reference(&pointer("/definitions/A"));
        tracker.log(data.error(ValidationErrorKind::NotFailed));
        assert!(!tracker.success_flag());
        assert_eq!(tracker.take_candidate_report().len(), 1);

        tracker.begin_candidate();
        assert!(tracker.success_flag());
        assert!(tracker.errored().contains(&pointer("/definitions/A")));
        assert_eq!(tracker.derive_matching(), Ok(Some(pointer("/definitions/B"))));
    }

    #[test]
    fn test_log_attributes_via_chain() {
        let instance = json!(1);
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/B"]));
        let data = ValidationData::new(&instance)
            .through_reference(&pointer("/definitions/A"))
            .through_reference(&pointer("/definitions/C"));
        tracker.log(data.error(ValidationErrorKind::NotFailed));
        assert_eq!(tracker.derive_matching(), Ok(Some(pointer("/definitions/B"))));
    }

    #[test]
    fn test_recorded_identity_does_not_fail_candidate() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/X", "/definitions/Y"]));
        tracker.begin_candidate();
        tracker.record_identity(&pointer("/definitions/Y"));
        assert!(tracker.success_flag());
        assert!(tracker.take_candidate_report().is_empty());
        assert_eq!(tracker.derive_matching(), Ok(Some(pointer("/definitions/X"))));
        assert!(tracker.nested_identities().contains(&pointer("/definitions/Y")));
    }

    #[test]
    fn test_recorded_identity_does_not_mark_enclosing_definition() {
        let mut tracker = OutcomeTracker::new(referenced(&["/definitions/A", "/definitions/B"]));
        tracker.record_identity(&pointer("/definitions/A/anyOf/0"));
        tracker.record_failure(&pointer("/definitions/B"));
        assert_eq!(tracker.derive_matching(), Ok(Some(pointer("/definitions/A"))));
    }
}
