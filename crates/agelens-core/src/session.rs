//! # Session Module
//!
//! The single mutable record describing workflow progress, and its
//! transition table.
//!
//! ## Transitions
//!
//! | Operation | Valid in | Target stage | Clears |
//! |-----------|----------|--------------|--------|
//! | `select_image` | any | ReadyToPredict | predicted, actual, advice |
//! | `select_model` | any | unchanged | nothing |
//! | `begin_prediction` / `complete_prediction` | image present | Compared | advice |
//! | `set_actual_age` | Compared, Tipped | unchanged | nothing |
//! | `begin_advice` / `complete_advice` | both ages present | Tipped | nothing |
//! | `return_to_upload` | any | Upload | image, predicted, actual, advice |
//! | `return_to_predict` | any | ReadyToPredict | predicted, actual, advice |
//! | `reset` | any | Upload | image, predicted, actual, advice |
//!
//! ## Requests
//!
//! Remote calls are split in two halves so that no lock needs to be held
//! while waiting. `begin_*` validates preconditions, marks the session as
//! pending and hands out a [`RequestTicket`] stamped with the current
//! generation. `complete_*` consumes the ticket, always clears the pending
//! flag, and applies the outcome only if nothing invalidated the request in
//! the meantime. Every transition that changes an input of a request bumps
//! the generation.

use crate::assessment;
use crate::{
    AdviceBundle, AgeStatus, ImageAsset, ModelCatalog, ModelId, RequestKind, ServiceError, Stage,
    WorkflowError,
};

// =============================================================================
// REQUEST TICKETS
// =============================================================================

/// Proof that a request was issued. Consumed on completion.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    kind: RequestKind,
    generation: u64,
}

impl RequestTicket {
    #[must_use]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Everything a prediction client needs, captured at issue time.
#[derive(Debug)]
pub struct PredictionJob {
    pub ticket: RequestTicket,
    pub image: ImageAsset,
    pub model: ModelId,
}

/// Everything an advice client needs, captured at issue time.
#[derive(Debug)]
pub struct AdviceJob {
    pub ticket: RequestTicket,
    pub predicted_age: f64,
    pub actual_age: u32,
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The result was written to the session.
    Applied,
    /// The session moved on while the request was in flight; the result was dropped.
    Discarded,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Workflow progress for one user session.
#[derive(Debug, Clone)]
pub struct SessionState {
    stage: Stage,
    image: Option<ImageAsset>,
    selected_model: ModelId,
    predicted_age: Option<f64>,
    actual_age: Option<u32>,
    advice: Option<AdviceBundle>,
    pending: Option<RequestKind>,
    generation: u64,
}

impl SessionState {
    /// Create a fresh session with the given model preference.
    #[must_use]
    pub fn new(selected_model: ModelId) -> Self {
        Self {
            stage: Stage::Upload,
            image: None,
            selected_model,
            predicted_age: None,
            actual_age: None,
            advice: None,
            pending: None,
            generation: 0,
        }
    }

    /// Create a fresh session preferring the catalog's first model.
    #[must_use]
    pub fn for_catalog(catalog: &ModelCatalog) -> Self {
        Self::new(catalog.default_entry().id.clone())
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn selected_model(&self) -> &ModelId {
        &self.selected_model
    }

    #[must_use]
    pub fn predicted_age(&self) -> Option<f64> {
        self.predicted_age
    }

    #[must_use]
    pub fn actual_age(&self) -> Option<u32> {
        self.actual_age
    }

    #[must_use]
    pub fn advice(&self) -> Option<&AdviceBundle> {
        self.advice.as_ref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Kind of the outstanding request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<RequestKind> {
        self.pending
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -------------------------------------------------------------------------
    // Derived queries
    // -------------------------------------------------------------------------

    /// Whole-year difference between the ages, when both are known.
    #[must_use]
    pub fn age_difference(&self) -> Option<u32> {
        Some(assessment::age_difference(
            self.predicted_age?,
            self.actual_age?,
        ))
    }

    /// Comparison tier, when both ages are known.
    #[must_use]
    pub fn age_status(&self) -> Option<AgeStatus> {
        Some(assessment::age_status(self.predicted_age?, self.actual_age?))
    }

    /// Check the field/stage invariants.
    ///
    /// - image present iff stage is not Upload
    /// - predicted age present iff stage is Compared or Tipped
    /// - advice present iff stage is Tipped
    /// - actual age only in Compared or Tipped
    #[must_use]
    pub fn invariants_hold(&self) -> bool {
        self.image.is_some() == (self.stage != Stage::Upload)
            && self.predicted_age.is_some() == self.stage.has_prediction()
            && self.advice.is_some() == (self.stage == Stage::Tipped)
            && (self.actual_age.is_none() || self.stage.has_prediction())
    }

    // -------------------------------------------------------------------------
    // Synchronous transitions
    // -------------------------------------------------------------------------

    /// Hold a new photo and move to ReadyToPredict.
    pub fn select_image(&mut self, asset: ImageAsset) -> Result<(), WorkflowError> {
        if !asset.is_image() {
            return Err(WorkflowError::InvalidAsset(asset.mime_type().to_string()));
        }
        self.clear_results();
        self.image = Some(asset);
        self.stage = Stage::ReadyToPredict;
        self.bump();
        Ok(())
    }

    /// Change the model preference. Re-selecting the current model is a no-op.
    pub fn select_model(&mut self, catalog: &ModelCatalog, id: &str) -> Result<(), WorkflowError> {
        let entry = catalog.get(id)?;
        if entry.id != self.selected_model {
            self.selected_model = entry.id.clone();
            self.bump();
        }
        Ok(())
    }

    /// Store the typed actual age.
    pub fn set_actual_age(&mut self, input: &str) -> Result<(), WorkflowError> {
        if !self.stage.has_prediction() {
            return Err(WorkflowError::InvalidTransition {
                operation: "enter an actual age",
                stage: self.stage,
            });
        }
        let age = parse_actual_age(input)?;
        if self.actual_age != Some(age) {
            self.actual_age = Some(age);
            self.bump();
        }
        Ok(())
    }

    /// Go back to photo selection.
    pub fn return_to_upload(&mut self) {
        self.clear_results();
        self.image = None;
        self.stage = Stage::Upload;
        self.bump();
    }

    /// Go back to prediction, keeping the photo.
    ///
    /// Without a photo there is nothing to predict on, so the session stays
    /// at Upload.
    pub fn return_to_predict(&mut self) {
        self.clear_results();
        self.stage = if self.image.is_some() {
            Stage::ReadyToPredict
        } else {
            Stage::Upload
        };
        self.bump();
    }

    /// Return to the initial state, keeping the model preference.
    ///
    /// An outstanding request stays marked as pending until it is completed
    /// or abandoned; its result is discarded either way.
    pub fn reset(&mut self) {
        self.return_to_upload();
    }

    /// Give up on an issued request whose outcome will never be delivered.
    ///
    /// Clears the pending mark so new requests can be issued. Nothing else
    /// changes.
    pub fn abandon(&mut self, ticket: RequestTicket) {
        self.release(&ticket);
    }

    // -------------------------------------------------------------------------
    // Request halves
    // -------------------------------------------------------------------------

    /// Validate and issue a prediction request.
    pub fn begin_prediction(&mut self) -> Result<PredictionJob, WorkflowError> {
        let image = self.image.clone().ok_or(WorkflowError::MissingAsset)?;
        let ticket = self.issue(RequestKind::Prediction)?;
        Ok(PredictionJob {
            ticket,
            image,
            model: self.selected_model.clone(),
        })
    }

    /// Apply the outcome of a prediction request.
    ///
    /// Returns `Ok(Discarded)` for stale tickets regardless of the outcome,
    /// and `Err(PredictionFailed)` when a current request failed.
    pub fn complete_prediction(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<f64, ServiceError>,
    ) -> Result<Completion, WorkflowError> {
        if !self.settle(&ticket, RequestKind::Prediction) {
            return Ok(Completion::Discarded);
        }
        let age = outcome.map_err(WorkflowError::PredictionFailed)?;
        if !age.is_finite() || age < 0.0 {
            return Err(WorkflowError::PredictionFailed(
                ServiceError::MalformedResponse(format!("predicted age out of range: {age}")),
            ));
        }
        self.predicted_age = Some(age);
        self.advice = None;
        self.stage = Stage::Compared;
        Ok(Completion::Applied)
    }

    /// Validate and issue an advice request.
    pub fn begin_advice(&mut self) -> Result<AdviceJob, WorkflowError> {
        let (Some(predicted_age), Some(actual_age)) = (self.predicted_age, self.actual_age) else {
            return Err(WorkflowError::IncompleteComparison);
        };
        let ticket = self.issue(RequestKind::Advice)?;
        Ok(AdviceJob {
            ticket,
            predicted_age,
            actual_age,
        })
    }

    /// Apply the outcome of an advice request.
    pub fn complete_advice(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<AdviceBundle, ServiceError>,
    ) -> Result<Completion, WorkflowError> {
        if !self.settle(&ticket, RequestKind::Advice) {
            return Ok(Completion::Discarded);
        }
        let advice = outcome.map_err(WorkflowError::AdviceFailed)?;
        self.advice = Some(advice);
        self.stage = Stage::Tipped;
        Ok(Completion::Applied)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn clear_results(&mut self) {
        self.predicted_age = None;
        self.actual_age = None;
        self.advice = None;
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn issue(&mut self, kind: RequestKind) -> Result<RequestTicket, WorkflowError> {
        if let Some(outstanding) = self.pending {
            return Err(WorkflowError::RequestPending(outstanding));
        }
        self.pending = Some(kind);
        Ok(RequestTicket {
            kind,
            generation: self.generation,
        })
    }

    /// Clear the pending flag for a finished request. True if the ticket is
    /// still current and its result may be applied.
    fn settle(&mut self, ticket: &RequestTicket, expected: RequestKind) -> bool {
        self.release(ticket);
        ticket.kind == expected && ticket.generation == self.generation
    }

    fn release(&mut self, ticket: &RequestTicket) {
        if self.pending == Some(ticket.kind) {
            self.pending = None;
        }
    }
}

/// Parse a typed age: a positive whole number, surrounding whitespace allowed.
pub fn parse_actual_age(input: &str) -> Result<u32, WorkflowError> {
    match input.trim().parse::<u32>() {
        Ok(age) if age > 0 => Ok(age),
        _ => Err(WorkflowError::InvalidAge(input.to_string())),
    }
}

// =============================================================================
// TESTS
// =============================================================================
