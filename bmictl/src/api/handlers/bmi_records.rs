use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    api::{
        models::bmi_records::{BmiRecordCreate, BmiRecordResponse},
        validation::{ValidationErrors, validate_create},
    },
    errors::{Error, ErrorBody, Result},
    types::parse_id,
};

/// List every BMI record, newest first.
#[utoipa::path(
    get,
    path = "/api/bmi-records",
    tag = "bmi_records",
    summary = "List BMI records",
    description = "All stored BMI records ordered by creation time, newest first",
    responses(
        (status = 200, description = "List of BMI records", body = [BmiRecordResponse]),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_bmi_records(State(state): State<AppState>) -> Result<Json<Vec<BmiRecordResponse>>> {
    let records = state
        .store
        .list_all_records()
        .await
        .map_err(|e| Error::database("fetch BMI records", e))?;

    Ok(Json(records.into_iter().map(BmiRecordResponse::from).collect()))
}

/// Store a completed BMI calculation.
///
/// The BMI and category are recomputed from the submitted weight and height; client-supplied
/// values are accepted but not trusted.
#[utoipa::path(
    post,
    path = "/api/bmi-records",
    tag = "bmi_records",
    summary = "Create BMI record",
    description = "Validate a calculation, recompute its BMI and category, and store it",
    request_body = BmiRecordCreate,
    responses(
        (status = 201, description = "BMI record created", body = BmiRecordResponse),
        (status = 400, description = "Invalid data, with one entry per failing field", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_bmi_record(
    State(state): State<AppState>,
    payload: std::result::Result<Json<BmiRecordCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<BmiRecordResponse>)> {
    let Json(data) = payload.map_err(|rejection| Error::Validation(ValidationErrors::single("body", rejection.body_text())))?;

    let validated = validate_create(&data).map_err(Error::Validation)?;
    let candidate = validated
        .into_db_request()
        .map_err(|e| Error::Validation(ValidationErrors::single("heightCm", e.to_string())))?;

    let record = state
        .store
        .create_record(&candidate)
        .await
        .map_err(|e| Error::database("create BMI record", e))?;

    metrics::counter!("bmictl_bmi_records_created_total", "category" => record.category.label()).increment(1);
    tracing::debug!(record_id = record.id, category = %record.category, "BMI record created");

    Ok((StatusCode::CREATED, Json(BmiRecordResponse::from(record))))
}

/// List the BMI records owned by one user, newest first.
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/bmi-records",
    tag = "bmi_records",
    summary = "List a user's BMI records",
    description = "BMI records owned by the given user, newest first. Empty if the user has none.",
    params(
        ("user_id" = i32, Path, description = "Positive integer user ID"),
    ),
    responses(
        (status = 200, description = "List of BMI records", body = [BmiRecordResponse]),
        (status = 400, description = "Invalid user ID", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    )
)]
#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn list_user_bmi_records(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<BmiRecordResponse>>> {
    let user_id = parse_id(&user_id).ok_or_else(|| Error::BadRequest {
        message: "Invalid user ID".to_string(),
    })?;

    let records = state
        .store
        .list_records_for_user(user_id)
        .await
        .map_err(|e| Error::database("fetch user BMI records", e))?;

    Ok(Json(records.into_iter().map(BmiRecordResponse::from).collect()))
}
