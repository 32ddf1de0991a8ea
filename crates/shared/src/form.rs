//! Booking form controller.
//!
//! Holds the draft plus the submission phase and the current error. Every
//! user action is a method; the view only renders what this reports.

use chrono::NaiveDate;

use crate::codec::{self, ParamSet};
use crate::host::{self, HostBridge, SubmitOutcome};
use crate::models::{BookingDraft, PitchSelection, SubmissionPayload};
use crate::validation::{self, FormField, ValidationError};

/// Shown when the host fails to take the booking.
pub const RETRY_MESSAGE: &str = "Could not send the booking. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Editing,
    /// A submission is in flight; confirm is disabled.
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("a submission is already in progress")]
    InFlight,
    #[error("the booking was already submitted")]
    Finished,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingForm {
    draft: BookingDraft,
    phase: FormPhase,
    error: Option<ValidationError>,
    notice: Option<String>,
}

impl Default for BookingForm {
    fn default() -> Self {
        BookingForm::new(BookingDraft::default())
    }
}

impl BookingForm {
    pub fn new(draft: BookingDraft) -> Self {
        BookingForm {
            draft,
            phase: FormPhase::Editing,
            error: None,
            notice: None,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn error(&self) -> Option<ValidationError> {
        self.error
    }

    /// Message that is not tied to a field (submission failures).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_flagged(&self, field: FormField) -> bool {
        self.error.is_some_and(|e| e.concerns(field))
    }

    pub fn pick_pitch_enabled(&self) -> bool {
        validation::dates_valid(self.draft.stay_from, self.draft.stay_to)
    }

    pub fn confirm_enabled(&self) -> bool {
        self.phase == FormPhase::Editing
    }

    fn edited(&mut self, fields: &[FormField]) {
        if let Some(err) = self.error {
            if fields.iter().any(|f| err.concerns(*f)) {
                self.error = None;
            }
        }
        self.notice = None;
    }

    pub fn set_stay_from(&mut self, date: Option<NaiveDate>) {
        self.draft.stay_from = date;
        self.edited(&[FormField::StayFrom]);
    }

    pub fn set_stay_to(&mut self, date: Option<NaiveDate>) {
        self.draft.stay_to = date;
        self.edited(&[FormField::StayTo]);
    }

    /// Guest count never drops below one.
    pub fn set_guest_count(&mut self, guests: u32) {
        self.draft.guest_count = guests.max(1);
        self.edited(&[]);
    }

    /// Handle a pick from the age selector. The empty placeholder value and
    /// anything unparseable are ignored; the selector resets either way.
    pub fn choose_child_age(&mut self, raw: &str) -> bool {
        let Ok(age) = raw.trim().parse::<u8>() else {
            return false;
        };
        let added = self.draft.add_child(age);
        if added {
            self.edited(&[]);
        }
        added
    }

    pub fn remove_child(&mut self, index: usize) -> Option<u8> {
        let removed = self.draft.remove_child(index);
        if removed.is_some() {
            self.edited(&[]);
        }
        removed
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.draft.contact.phone = phone.into();
        self.edited(&[FormField::Phone]);
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.draft.contact.email = email.into();
        self.edited(&[FormField::Email]);
    }

    pub fn set_pitch(&mut self, pitch: Option<PitchSelection>) {
        self.draft.pitch = pitch;
        self.edited(&[]);
    }

    /// Apply parameters that arrived with navigation.
    pub fn absorb(&mut self, params: &ParamSet) {
        codec::decode(params).apply_to(&mut self.draft);
    }

    /// Validate the dates and produce the parameters for the map URL.
    pub fn navigate_to_map(&mut self) -> Result<ParamSet, ValidationError> {
        match validation::validate_for_map(&self.draft) {
            Ok(()) => {
                self.error = None;
                Ok(codec::encode(&self.draft))
            }
            Err(e) => {
                tracing::debug!(error = %e, "Map navigation blocked");
                self.error = Some(e);
                Err(e)
            }
        }
    }

    /// Validate everything and enter `Submitting`.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, SubmitRejected> {
        match self.phase {
            FormPhase::Submitting => return Err(SubmitRejected::InFlight),
            FormPhase::Submitted => return Err(SubmitRejected::Finished),
            FormPhase::Editing => {}
        }

        let (from, to) = match validation::validate_for_submit(&self.draft) {
            Ok(range) => range,
            Err(e) => {
                tracing::debug!(error = %e, "Submission blocked");
                self.error = Some(e);
                return Err(e.into());
            }
        };

        self.error = None;
        self.notice = None;
        self.phase = FormPhase::Submitting;

        let draft = &self.draft;
        Ok(SubmissionPayload {
            from,
            to,
            guests: draft.guest_count,
            children_count: draft.children.len(),
            children_ages: draft.children.clone(),
            phone: validation::normalize_phone(&draft.contact.phone),
            email: draft.contact.email.trim().to_string(),
            pitch_id: draft.pitch.as_ref().map(|p| p.id.clone()),
            pitch_name: draft.pitch.as_ref().map(|p| p.display_name.clone()),
        })
    }

    /// Resolve the in-flight submission.
    pub fn finish_submit(&mut self, outcome: &SubmitOutcome) {
        if self.phase != FormPhase::Submitting {
            tracing::warn!(phase = ?self.phase, "Submission finished while none was in flight");
            return;
        }
        match outcome {
            SubmitOutcome::Delivered => {
                self.phase = FormPhase::Submitted;
            }
            SubmitOutcome::ShownLocally => {
                self.phase = FormPhase::Editing;
            }
            SubmitOutcome::Failed(reason) => {
                tracing::warn!(reason = %reason, "Submission failed");
                self.phase = FormPhase::Editing;
                self.notice = Some(RETRY_MESSAGE.to_string());
            }
        }
    }

    /// Validate, deliver through `host` and resolve in one step.
    pub fn submit(
        &mut self,
        host: &dyn HostBridge,
        close_after: bool,
    ) -> Result<SubmitOutcome, SubmitRejected> {
        let payload = self.begin_submit()?;
        let outcome = host::deliver(host, &payload, close_after);
        self.finish_submit(&outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::testing::RecordingHost;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dated_form() -> BookingForm {
        let mut form = BookingForm::default();
        form.set_stay_from(Some(date("2025-06-01")));
        form.set_stay_to(Some(date("2025-06-05")));
        form
    }

    #[test]
    fn test_pick_pitch_follows_date_changes() {
        let mut form = BookingForm::default();
        assert!(!form.pick_pitch_enabled());
        form.set_stay_from(Some(date("2025-06-05")));
        form.set_stay_to(Some(date("2025-06-01")));
        assert!(!form.pick_pitch_enabled());
        form.set_stay_to(Some(date("2025-06-05")));
        assert!(form.pick_pitch_enabled());
        form.set_stay_from(None);
        assert!(!form.pick_pitch_enabled());
    }

    #[test]
    fn test_navigate_to_map_requires_dates() {
        let mut form = BookingForm::default();
        assert_eq!(form.navigate_to_map(), Err(ValidationError::MissingDates));
        assert!(form.is_flagged(FormField::StayFrom));
    }

    #[test]
    fn test_navigate_to_map_encodes_draft() {
        let mut form = dated_form();
        form.set_guest_count(2);
        let params = form.navigate_to_map().unwrap();
        assert_eq!(params.get("from"), Some("2025-06-01"));
        assert_eq!(params.get("guests"), Some("2"));
        assert!(form.error().is_none());
    }

    #[test]
    fn test_guest_count_floor() {
        let mut form = BookingForm::default();
        form.set_guest_count(0);
        assert_eq!(form.draft().guest_count, 1);
    }

    #[test]
    fn test_child_age_selector() {
        let mut form = BookingForm::default();
        assert!(form.choose_child_age("5"));
        assert!(form.choose_child_age("5"));
        assert!(form.choose_child_age("0"));
        assert!(!form.choose_child_age(""));
        assert!(!form.choose_child_age("14"));
        assert_eq!(form.draft().children, vec![5, 5, 0]);
        assert_eq!(form.remove_child(1), Some(5));
        assert_eq!(form.draft().children, vec![5, 0]);
    }

    #[test]
    fn test_confirm_first_failure_is_dates() {
        let mut form = BookingForm::default();
        form.set_phone("abc");
        assert_eq!(
            form.begin_submit(),
            Err(SubmitRejected::Invalid(ValidationError::MissingDates))
        );
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_confirm_flags_bad_phone_and_keeps_input() {
        let mut form = dated_form();
        form.set_phone("abc");
        form.set_email("a@b.co");
        assert_eq!(
            form.begin_submit(),
            Err(SubmitRejected::Invalid(ValidationError::Phone))
        );
        assert!(form.is_flagged(FormField::Phone));
        assert_eq!(form.draft().contact.phone, "abc");
        assert_eq!(form.draft().contact.email, "a@b.co");
    }

    #[test]
    fn test_editing_flagged_field_clears_error() {
        let mut form = dated_form();
        form.begin_submit().unwrap_err();
        assert_eq!(form.error(), Some(ValidationError::MissingContact));
        form.set_guest_count(3);
        assert!(form.error().is_some());
        form.set_email("a@b.co");
        assert!(form.error().is_none());
    }

    #[test]
    fn test_submit_guard_blocks_reentry() {
        let mut form = dated_form();
        form.set_phone("+1 202 555 0123");
        let payload = form.begin_submit().unwrap();
        assert_eq!(payload.phone, "+12025550123");
        assert!(!form.confirm_enabled());
        assert_eq!(form.begin_submit(), Err(SubmitRejected::InFlight));
    }

    #[test]
    fn test_failed_submission_unblocks_with_retry_message() {
        let mut form = dated_form();
        form.set_phone("+12025550123");
        form.begin_submit().unwrap();
        form.finish_submit(&SubmitOutcome::Failed("boom".to_string()));
        assert_eq!(form.phase(), FormPhase::Editing);
        assert_eq!(form.notice(), Some(RETRY_MESSAGE));
        assert!(form.begin_submit().is_ok());
    }

    #[test]
    fn test_local_display_returns_to_editing() {
        let mut form = dated_form();
        form.set_email("a@b.co");
        let host = RecordingHost::default();
        let outcome = form.submit(&host, true).unwrap();
        assert_eq!(outcome, SubmitOutcome::ShownLocally);
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(form.confirm_enabled());
    }

    #[test]
    fn test_delivered_submission_is_final() {
        let mut form = dated_form();
        form.set_email("a@b.co");
        let host = RecordingHost::present();
        assert_eq!(form.submit(&host, true).unwrap(), SubmitOutcome::Delivered);
        assert_eq!(form.phase(), FormPhase::Submitted);
        assert_eq!(form.begin_submit(), Err(SubmitRejected::Finished));
    }

    #[test]
    fn test_finish_without_submission_is_ignored() {
        let mut form = BookingForm::default();
        form.finish_submit(&SubmitOutcome::Delivered);
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn test_absorb_navigation_params() {
        let mut form = dated_form();
        form.set_guest_count(4);
        let mut params = ParamSet::new();
        params.insert("pitch_id", "P12");
        params.insert("layer", "pitches_60");
        form.absorb(&params);
        assert_eq!(form.draft().guest_count, 4);
        assert_eq!(form.draft().pitch.as_ref().unwrap().id, "P12");
    }
}
