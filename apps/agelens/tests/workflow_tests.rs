//! Controller tests against in-process fake services.

#![allow(clippy::unwrap_used, clippy::panic)]

use agelens::client::{AdviceSource, AgePredictor};
use agelens::workflow::WorkflowController;
use agelens_core::{
    AdviceBundle, AgeStatus, Completion, ImageAsset, ModelCatalog, ModelId, RequestKind,
    ServiceError, Stage, WorkflowError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// =============================================================================
// FAKES
// =============================================================================

/// Lets a test hold a request in flight until it says otherwise.
#[derive(Clone, Default)]
struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

#[derive(Clone)]
struct FakePredictor {
    calls: Arc<AtomicUsize>,
    seen_models: Arc<Mutex<Vec<ModelId>>>,
    outcome: Result<f64, ServiceError>,
    gate: Option<Gate>,
}

impl FakePredictor {
    fn returning(outcome: Result<f64, ServiceError>) -> Self {
        Self {
            calls: Arc::default(),
            seen_models: Arc::default(),
            outcome,
            gate: None,
        }
    }

    fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }
}

impl AgePredictor for FakePredictor {
    async fn predict(&self, _image: &ImageAsset, model: &ModelId) -> Result<f64, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_models.lock().unwrap().push(model.clone());
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.outcome.clone()
    }
}

#[derive(Clone)]
struct FakeAdvisor {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(f64, u32)>>>,
    outcome: Result<AdviceBundle, ServiceError>,
    gate: Option<Gate>,
}

impl FakeAdvisor {
    fn returning(outcome: Result<AdviceBundle, ServiceError>) -> Self {
        Self {
            calls: Arc::default(),
            seen: Arc::default(),
            outcome,
            gate: None,
        }
    }

    fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }
}

impl AdviceSource for FakeAdvisor {
    async fn fetch_advice(
        &self,
        predicted_age: f64,
        actual_age: u32,
    ) -> Result<AdviceBundle, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push((predicted_age, actual_age));
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.outcome.clone()
    }
}

fn jpeg() -> ImageAsset {
    ImageAsset::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
}

fn png() -> ImageAsset {
    ImageAsset::new(vec![0x89, b'P', b'N', b'G'], "image/png")
}

fn bundle() -> AdviceBundle {
    AdviceBundle {
        summary: "Looking good.".to_string(),
        health_tips: vec!["Hydrate".to_string()],
        skincare_tips: vec!["Sunscreen".to_string()],
        lifestyle_tips: vec!["Sleep".to_string()],
    }
}

fn controller(
    predictor: FakePredictor,
    advisor: FakeAdvisor,
) -> WorkflowController<FakePredictor, FakeAdvisor> {
    WorkflowController::new(ModelCatalog::builtin(), predictor, advisor)
}

// =============================================================================
// HAPPY PATH
// =============================================================================

#[tokio::test]
async fn full_flow_reaches_tipped() {
    let predictor = FakePredictor::returning(Ok(45.4));
    let advisor = FakeAdvisor::returning(Ok(bundle()));
    let seen_models = predictor.seen_models.clone();
    let seen_ages = advisor.seen.clone();
    let wf = controller(predictor, advisor);

    assert_eq!(wf.stage(), Stage::Upload);
    wf.select_model("ensemble").unwrap();
    wf.select_image(jpeg()).unwrap();
    assert_eq!(wf.stage(), Stage::ReadyToPredict);

    assert_eq!(wf.request_prediction().await, Ok(Completion::Applied));
    assert_eq!(wf.stage(), Stage::Compared);
    assert_eq!(seen_models.lock().unwrap().as_slice(), [ModelId::new("ensemble")]);

    wf.set_actual_age("40").unwrap();
    assert_eq!(wf.age_difference(), Some(5));
    assert_eq!(wf.age_status(), Some(AgeStatus::Moderate));

    assert_eq!(wf.request_advice().await, Ok(Completion::Applied));
    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::Tipped);
    assert_eq!(snapshot.advice(), Some(&bundle()));
    assert_eq!(seen_ages.lock().unwrap().as_slice(), [(45.4, 40)]);
    assert!(snapshot.invariants_hold());
}

// =============================================================================
// VALIDATION NEVER REACHES THE CLIENTS
// =============================================================================

#[tokio::test]
async fn prediction_without_image_makes_no_call() {
    let predictor = FakePredictor::returning(Ok(30.0));
    let calls = predictor.calls.clone();
    let wf = controller(predictor, FakeAdvisor::returning(Ok(bundle())));

    assert_eq!(wf.request_prediction().await, Err(WorkflowError::MissingAsset));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(wf.stage(), Stage::Upload);
}

#[tokio::test]
async fn advice_without_actual_age_makes_no_call() {
    let advisor = FakeAdvisor::returning(Ok(bundle()));
    let calls = advisor.calls.clone();
    let wf = controller(FakePredictor::returning(Ok(30.0)), advisor);

    wf.select_image(jpeg()).unwrap();
    wf.request_prediction().await.unwrap();

    assert_eq!(
        wf.request_advice().await,
        Err(WorkflowError::IncompleteComparison)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(wf.stage(), Stage::Compared);
}

#[tokio::test]
async fn non_image_is_rejected_before_upload() {
    let wf = controller(
        FakePredictor::returning(Ok(30.0)),
        FakeAdvisor::returning(Ok(bundle())),
    );

    let pdf = ImageAsset::new(b"%PDF-1.7".to_vec(), "application/pdf");
    assert!(matches!(
        wf.select_image(pdf),
        Err(WorkflowError::InvalidAsset(_))
    ));
    assert_eq!(wf.stage(), Stage::Upload);
}

// =============================================================================
// REMOTE FAILURES
// =============================================================================

#[tokio::test]
async fn prediction_failure_stays_ready() {
    let failure = ServiceError::Server {
        status: 500,
        message: "boom".to_string(),
    };
    let wf = controller(
        FakePredictor::returning(Err(failure.clone())),
        FakeAdvisor::returning(Ok(bundle())),
    );

    wf.select_image(jpeg()).unwrap();
    assert_eq!(
        wf.request_prediction().await,
        Err(WorkflowError::PredictionFailed(failure))
    );

    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::ReadyToPredict);
    assert!(!snapshot.is_pending());
    assert!(snapshot.image().is_some());
}

#[tokio::test]
async fn malformed_advice_keeps_comparison() {
    let malformed = ServiceError::MalformedResponse("missing field `healthTips`".to_string());
    let wf = controller(
        FakePredictor::returning(Ok(52.0)),
        FakeAdvisor::returning(Err(malformed.clone())),
    );

    wf.select_image(jpeg()).unwrap();
    wf.request_prediction().await.unwrap();
    wf.set_actual_age("40").unwrap();

    assert_eq!(
        wf.request_advice().await,
        Err(WorkflowError::AdviceFailed(malformed))
    );
    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::Compared);
    assert_eq!(snapshot.age_status(), Some(AgeStatus::Attention));
    assert!(snapshot.advice().is_none());
}

// =============================================================================
// OVERLAPPING INTENTS
// =============================================================================

#[tokio::test]
async fn new_image_discards_in_flight_prediction() {
    let gate = Gate::default();
    let wf = controller(
        FakePredictor::returning(Ok(61.0)).gated(&gate),
        FakeAdvisor::returning(Ok(bundle())),
    );
    wf.select_image(jpeg()).unwrap();

    let (completion, ()) = tokio::join!(wf.request_prediction(), async {
        gate.started.notified().await;
        wf.select_image(png()).unwrap();
        gate.release.notify_one();
    });

    assert_eq!(completion, Ok(Completion::Discarded));
    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::ReadyToPredict);
    assert_eq!(snapshot.image().map(ImageAsset::mime_type), Some("image/png"));
    assert!(snapshot.predicted_age().is_none());
    assert!(!snapshot.is_pending());
}

#[tokio::test]
async fn second_request_while_pending_is_refused() {
    let gate = Gate::default();
    let predictor = FakePredictor::returning(Ok(33.0)).gated(&gate);
    let calls = predictor.calls.clone();
    let wf = controller(predictor, FakeAdvisor::returning(Ok(bundle())));
    wf.select_image(jpeg()).unwrap();

    let (first, second) = tokio::join!(wf.request_prediction(), async {
        gate.started.notified().await;
        let refused = wf.request_prediction().await;
        gate.release.notify_one();
        refused
    });

    assert_eq!(
        second,
        Err(WorkflowError::RequestPending(RequestKind::Prediction))
    );
    assert_eq!(first, Ok(Completion::Applied));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(wf.stage(), Stage::Compared);
}

#[tokio::test]
async fn reset_discards_in_flight_advice() {
    let gate = Gate::default();
    let wf = controller(
        FakePredictor::returning(Ok(38.0)),
        FakeAdvisor::returning(Ok(bundle())).gated(&gate),
    );
    wf.select_model("hybrid").unwrap();
    wf.select_image(jpeg()).unwrap();
    wf.request_prediction().await.unwrap();
    wf.set_actual_age("40").unwrap();

    let (completion, ()) = tokio::join!(wf.request_advice(), async {
        gate.started.notified().await;
        wf.reset();
        gate.release.notify_one();
    });

    assert_eq!(completion, Ok(Completion::Discarded));
    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::Upload);
    assert_eq!(snapshot.selected_model().as_str(), "hybrid");
    assert!(snapshot.advice().is_none());
    assert!(snapshot.invariants_hold());
}

#[tokio::test]
async fn retry_after_return_to_predict() {
    let wf = controller(
        FakePredictor::returning(Ok(29.6)),
        FakeAdvisor::returning(Ok(bundle())),
    );
    wf.select_image(jpeg()).unwrap();
    wf.request_prediction().await.unwrap();
    wf.set_actual_age("35").unwrap();

    wf.return_to_predict();
    assert_eq!(wf.stage(), Stage::ReadyToPredict);
    assert_eq!(wf.age_status(), None);

    assert_eq!(wf.request_prediction().await, Ok(Completion::Applied));
    assert_eq!(wf.stage(), Stage::Compared);
}

#[tokio::test]
async fn dropped_request_does_not_leave_session_pending() {
    let gate = Gate::default();
    let predictor = FakePredictor::returning(Ok(27.0)).gated(&gate);
    let calls = predictor.calls.clone();
    let wf = controller(predictor, FakeAdvisor::returning(Ok(bundle())));
    wf.select_image(jpeg()).unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), wf.request_prediction()).await;
    assert!(timed_out.is_err());
    assert!(!wf.snapshot().is_pending());

    wf.reset();
    wf.select_image(png()).unwrap();
    gate.release.notify_one();

    assert_eq!(wf.request_prediction().await, Ok(Completion::Applied));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let snapshot = wf.snapshot();
    assert_eq!(snapshot.stage(), Stage::Compared);
    assert_eq!(snapshot.predicted_age(), Some(27.0));
    assert!(snapshot.invariants_hold());
}
