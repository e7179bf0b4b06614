#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    operation_id = "liveness",
    summary = "Liveness probe",
    responses((status = 200, description = "Service is running", body = String)),
)]
pub async fn root() -> &'static str {
    "Contest Hub API"
}
