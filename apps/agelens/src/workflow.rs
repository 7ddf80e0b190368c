//! # Workflow Controller
//!
//! Owns the [`SessionState`] of one user session and drives it against the
//! prediction and advice clients.
//!
//! The session lock is only held for the synchronous halves of a transition.
//! While a request is outstanding other intents can still be applied; the
//! session's generation counter decides whether the late result still counts.
//!
//! A request future dropped before completion (a timeout, a losing `select!`
//! branch) abandons its ticket, so the session does not stay pending.

use crate::client::{AdviceSource, AgePredictor};
use agelens_core::{
    AdviceJob, AgeStatus, Completion, ImageAsset, ModelCatalog, PredictionJob, RequestKind,
    RequestTicket, SessionState, Stage, WorkflowError,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Orchestrates the four-stage workflow.
pub struct WorkflowController<P, A> {
    catalog: ModelCatalog,
    session: Mutex<SessionState>,
    predictor: P,
    advisor: A,
}

impl<P: AgePredictor, A: AdviceSource> WorkflowController<P, A> {
    /// Start a session preferring the catalog's first model.
    pub fn new(catalog: ModelCatalog, predictor: P, advisor: A) -> Self {
        let session = SessionState::for_catalog(&catalog);
        Self::with_session(catalog, session, predictor, advisor)
    }

    /// Start from an existing session state.
    pub fn with_session(
        catalog: ModelCatalog,
        session: SessionState,
        predictor: P,
        advisor: A,
    ) -> Self {
        Self {
            catalog,
            session: Mutex::new(session),
            predictor,
            advisor,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        lock_session(&self.session)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    /// Copy of the current session state for rendering.
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn stage(&self) -> Stage {
        self.lock().stage()
    }

    pub fn age_difference(&self) -> Option<u32> {
        self.lock().age_difference()
    }

    pub fn age_status(&self) -> Option<AgeStatus> {
        self.lock().age_status()
    }

    // -------------------------------------------------------------------------
    // Synchronous intents
    // -------------------------------------------------------------------------

    pub fn select_image(&self, asset: ImageAsset) -> Result<(), WorkflowError> {
        let mime = asset.mime_type().to_string();
        let bytes = asset.len();
        self.lock().select_image(asset).inspect_err(|e| {
            tracing::warn!(mime = %mime, "Image rejected: {}", e);
        })?;
        tracing::info!(mime = %mime, bytes, "Image selected");
        Ok(())
    }

    pub fn select_model(&self, id: &str) -> Result<(), WorkflowError> {
        self.lock().select_model(&self.catalog, id)?;
        tracing::info!(model = id, "Model selected");
        Ok(())
    }

    pub fn set_actual_age(&self, input: &str) -> Result<(), WorkflowError> {
        self.lock().set_actual_age(input)
    }

    pub fn return_to_upload(&self) {
        self.lock().return_to_upload();
        tracing::info!("Returned to upload");
    }

    pub fn return_to_predict(&self) {
        let stage = {
            let mut session = self.lock();
            session.return_to_predict();
            session.stage()
        };
        tracing::info!(stage = ?stage, "Returned to prediction");
    }

    pub fn reset(&self) {
        self.lock().reset();
        tracing::info!("Session reset");
    }

    // -------------------------------------------------------------------------
    // Requests
    // -------------------------------------------------------------------------

    /// Send the held photo for prediction.
    ///
    /// Fails synchronously with `MissingAsset` (no photo) or `RequestPending`
    /// (another request outstanding) without contacting the client.
    pub async fn request_prediction(&self) -> Result<Completion, WorkflowError> {
        let PredictionJob {
            ticket,
            image,
            model,
        } = self.lock().begin_prediction()?;

        let in_flight = InFlight::new(&self.session, ticket);
        tracing::info!(model = %model, "Prediction requested");
        let outcome = self.predictor.predict(&image, &model).await;

        let result = in_flight.finish(|session, ticket| session.complete_prediction(ticket, outcome));
        log_completion(RequestKind::Prediction, &result);
        result
    }

    /// Ask for advice on the current comparison.
    ///
    /// Fails synchronously with `IncompleteComparison` when either age is
    /// missing.
    pub async fn request_advice(&self) -> Result<Completion, WorkflowError> {
        let AdviceJob {
            ticket,
            predicted_age,
            actual_age,
        } = self.lock().begin_advice()?;

        let in_flight = InFlight::new(&self.session, ticket);
        tracing::info!(predicted_age, actual_age, "Advice requested");
        let outcome = self.advisor.fetch_advice(predicted_age, actual_age).await;

        let result = in_flight.finish(|session, ticket| session.complete_advice(ticket, outcome));
        log_completion(RequestKind::Advice, &result);
        result
    }
}

fn lock_session(session: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // Transitions never panic mid-update, so a poisoned lock still holds
    // a consistent state.
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds an issued ticket across the await. Dropped unfinished, it abandons
/// the ticket.
struct InFlight<'a> {
    session: &'a Mutex<SessionState>,
    ticket: Option<RequestTicket>,
}

impl<'a> InFlight<'a> {
    fn new(session: &'a Mutex<SessionState>, ticket: RequestTicket) -> Self {
        Self {
            session,
            ticket: Some(ticket),
        }
    }

    fn finish(
        mut self,
        complete: impl FnOnce(&mut SessionState, RequestTicket) -> Result<Completion, WorkflowError>,
    ) -> Result<Completion, WorkflowError> {
        match self.ticket.take() {
            Some(ticket) => complete(&mut lock_session(self.session), ticket),
            None => Ok(Completion::Discarded),
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            let kind = ticket.kind();
            lock_session(self.session).abandon(ticket);
            tracing::debug!(request = %kind, "Request abandoned before completion");
        }
    }
}

fn log_completion(kind: RequestKind, result: &Result<Completion, WorkflowError>) {
    match result {
        Ok(Completion::Applied) => tracing::info!(request = %kind, "Request completed"),
        Ok(Completion::Discarded) => {
            tracing::debug!(request = %kind, "Stale response discarded");
        }
        Err(e) => tracing::warn!(request = %kind, "Request failed: {}", e),
    }
}
