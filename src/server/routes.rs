//! Request handlers, one GET/POST pair per model family.
//!
//! Every request-path failure is turned into a rendered failure view here;
//! nothing on this surface can crash the process.

use std::sync::Arc;

use axum::extract::{Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::domain::{
    DiabetesFields, FormValues, ImageUpload, LungCancerFields, ModelId, PredictionResult,
    TabularRequest, ValidationError,
};
use crate::ports::PageView;
use crate::server::AppContext;
use crate::MedscreenError;

pub(super) async fn index(State(ctx): State<Arc<AppContext>>) -> Response {
    page(&ctx, "index.html", PageView::empty(), StatusCode::OK)
}

pub(super) async fn diabetes_form(State(ctx): State<Arc<AppContext>>) -> Response {
    page(&ctx, "diabetes.html", PageView::empty(), StatusCode::OK)
}

pub(super) async fn diabetes_predict(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<FormValues>,
) -> Response {
    let outcome = match DiabetesFields::from_form(&form) {
        Ok(fields) => {
            ctx.service
                .predict_tabular(&TabularRequest::Diabetes(fields))
                .await
        }
        Err(e) => Err(e.into()),
    };
    respond(&ctx, "diabetes.html", outcome)
}

pub(super) async fn lungcancer_form(State(ctx): State<Arc<AppContext>>) -> Response {
    page(&ctx, "lungcancer.html", PageView::empty(), StatusCode::OK)
}

pub(super) async fn lungcancer_predict(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<FormValues>,
) -> Response {
    let outcome = match LungCancerFields::from_form(&form) {
        Ok(fields) => {
            ctx.service
                .predict_tabular(&TabularRequest::LungCancer(fields))
                .await
        }
        Err(e) => Err(e.into()),
    };
    respond(&ctx, "lungcancer.html", outcome)
}

pub(super) async fn braintumor_form(State(ctx): State<Arc<AppContext>>) -> Response {
    page(&ctx, "braintumor.html", PageView::empty(), StatusCode::OK)
}

pub(super) async fn braintumor_predict(
    State(ctx): State<Arc<AppContext>>,
    multipart: Multipart,
) -> Response {
    let outcome = match extract_upload(multipart).await {
        Ok(upload) => ctx.service.predict_image(ModelId::BrainTumor, &upload).await,
        Err(e) => Err(e),
    };
    respond(&ctx, "braintumor.html", outcome)
}

/// Pull the `file` part out of the multipart body.
async fn extract_upload(mut multipart: Multipart) -> Result<ImageUpload, MedscreenError> {
    while let Some(field) = multipart.next_field().await.map_err(read_failure)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(read_failure)?;
            return Ok(ImageUpload {
                bytes: bytes.to_vec(),
                filename,
            });
        }
    }
    Err(ValidationError::Missing("file").into())
}

fn read_failure(e: axum::extract::multipart::MultipartError) -> MedscreenError {
    MedscreenError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

fn respond(
    ctx: &AppContext,
    template: &str,
    outcome: crate::Result<PredictionResult>,
) -> Response {
    match outcome {
        Ok(result) => page(
            ctx,
            template,
            PageView::result(result.label.as_str()),
            StatusCode::OK,
        ),
        Err(e) => {
            tracing::warn!(template, error = %e, "request failed");
            page(ctx, template, PageView::error(e.to_string()), failure_status(&e))
        }
    }
}

/// HTTP status for each failure class.
fn failure_status(err: &MedscreenError) -> StatusCode {
    match err {
        MedscreenError::Validation(_) | MedscreenError::Decode(_) => StatusCode::BAD_REQUEST,
        MedscreenError::Registry(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn page(ctx: &AppContext, template: &str, view: PageView, status: StatusCode) -> Response {
    match ctx.renderer.render(template, &view) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(template, error = %e, "renderer failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
        }
    }
}
