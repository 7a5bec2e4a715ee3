//! Request pipeline: an ordered list of named stages.
//!
//! Each stage carries a [`Branch`] predicate over the request's
//! [`RequestClassification`]. The list is built once from settings and folded
//! into axum layers, first stage outermost. A stage whose branch does not match
//! the current request simply calls the next one.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_http::services::ServeDir;

use crate::context::RequestClassification;
use crate::middleware::{self, CredentialGate};
use crate::settings::Settings;

mod error_handling;
mod localization;
mod request_logging;
mod static_files;
mod transport;

pub use error_handling::ERROR_PAGE_TEMPLATE;
pub use localization::negotiate_culture;
pub use transport::REQUEST_ID_HEADER;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Branch {
    Any,
    Web,
    Api,
}

impl Branch {
    pub fn matches(self, classification: RequestClassification) -> bool {
        match self {
            Branch::Any => true,
            Branch::Web => classification.is_web(),
            Branch::Api => classification.is_api(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StageKind {
    RequestContext,
    HttpsRedirection,
    RequestLocalization,
    ExceptionPage,
    Hsts,
    StatusCodePages,
    ProblemDetailsExceptions,
    ProblemDetailsStatusCodes,
    StaticFiles,
    CredentialGate,
    RequestLogging,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Stage {
    pub kind: StageKind,
    pub branch: Branch,
}

impl Stage {
    const fn new(kind: StageKind, branch: Branch) -> Self {
        Self { kind, branch }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            StageKind::RequestContext => "request_context",
            StageKind::HttpsRedirection => "https_redirection",
            StageKind::RequestLocalization => "request_localization",
            StageKind::ExceptionPage => "exception_handler",
            StageKind::Hsts => "hsts",
            StageKind::StatusCodePages => "status_code_pages",
            StageKind::ProblemDetailsExceptions => "problem_details_exception_handler",
            StageKind::ProblemDetailsStatusCodes => "problem_details_status_codes",
            StageKind::StaticFiles => "static_files",
            StageKind::CredentialGate => "credential_gate",
            StageKind::RequestLogging => "request_logging",
        }
    }
}

/// Everything a stage may need; shared by all stages of one pipeline.
pub struct PipelineContext {
    pub settings: Arc<Settings>,
    pub gate: CredentialGate,
    /// Routing table without the pipeline, used to re-execute error pages.
    pub endpoints: Router,
    pub static_files: ServeDir,
}

impl PipelineContext {
    pub fn new(settings: Arc<Settings>, endpoints: Router) -> Self {
        Self {
            gate: CredentialGate::from_settings(&settings.swagger),
            static_files: ServeDir::new(&settings.hosting.web_root),
            settings,
            endpoints,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn for_settings(settings: &Settings) -> Self {
        use Branch::{Any, Api, Web};

        let mut stages = vec![
            Stage::new(StageKind::RequestContext, Any),
            Stage::new(StageKind::HttpsRedirection, Web),
            Stage::new(StageKind::RequestLocalization, Web),
        ];
        if !settings.hosting.environment.is_development() {
            stages.push(Stage::new(StageKind::ExceptionPage, Web));
            stages.push(Stage::new(StageKind::Hsts, Web));
        }
        stages.extend([
            Stage::new(StageKind::StatusCodePages, Web),
            Stage::new(StageKind::ProblemDetailsExceptions, Api),
            Stage::new(StageKind::ProblemDetailsStatusCodes, Api),
            Stage::new(StageKind::StaticFiles, Any),
        ]);
        if settings.swagger.enabled {
            stages.push(Stage::new(StageKind::CredentialGate, Any));
        }
        stages.push(Stage::new(StageKind::RequestLogging, Any));

        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Wrap `endpoints` in every stage, first stage outermost.
    pub fn apply(&self, endpoints: Router, context: Arc<PipelineContext>) -> Router {
        self.stages.iter().rev().fold(endpoints, |router, stage| {
            let state = StageState {
                stage: *stage,
                context: context.clone(),
            };
            router.layer(axum::middleware::from_fn_with_state(state, run_stage))
        })
    }
}

#[derive(Clone)]
struct StageState {
    stage: Stage,
    context: Arc<PipelineContext>,
}

async fn run_stage(State(state): State<StageState>, req: Request, next: Next) -> Response {
    let StageState { stage, context } = state;

    let classification = req
        .extensions()
        .get::<RequestClassification>()
        .copied()
        .unwrap_or_else(|| RequestClassification::classify(req.uri().path(), req.headers()));
    if !stage.branch.matches(classification) {
        return next.run(req).await;
    }

    let settings = &context.settings;
    match stage.kind {
        StageKind::RequestContext => transport::request_context(req, next).await,
        StageKind::HttpsRedirection => transport::https_redirection(settings, req, next).await,
        StageKind::RequestLocalization => {
            localization::request_localization(settings, req, next).await
        }
        StageKind::ExceptionPage => error_handling::exception_page(req, next).await,
        StageKind::Hsts => transport::hsts(req, next).await,
        StageKind::StatusCodePages => {
            error_handling::status_code_pages(&context.endpoints, req, next).await
        }
        StageKind::ProblemDetailsExceptions => {
            error_handling::problem_details_exceptions(req, next).await
        }
        StageKind::ProblemDetailsStatusCodes => {
            error_handling::problem_details_status_codes(req, next).await
        }
        StageKind::StaticFiles => static_files::static_files(&context.static_files, req, next).await,
        StageKind::CredentialGate => {
            middleware::credential_gate(State(context.gate.clone()), req, next).await
        }
        StageKind::RequestLogging => request_logging::request_logging(req, next).await,
    }
}
