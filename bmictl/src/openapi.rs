//! OpenAPI documentation for the record API, served at `/api-docs/openapi.json` and rendered by
//! Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "bmictl",
        description = "BMI calculation records: store completed calculations and list them, globally or per user."
    ),
    paths(
        api::handlers::bmi_records::list_bmi_records,
        api::handlers::bmi_records::create_bmi_record,
        api::handlers::bmi_records::list_user_bmi_records,
    ),
    components(schemas(
        api::models::bmi_records::BmiRecordCreate,
        api::models::bmi_records::BmiRecordResponse,
        api::validation::FieldError,
        crate::bmi::BmiCategory,
        crate::bmi::WeightUnit,
        crate::errors::ErrorBody,
    )),
    tags(
        (name = "bmi_records", description = "BMI record storage"),
    )
)]
pub struct ApiDoc;
