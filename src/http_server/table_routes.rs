//! Table HTTP Routes
//!
//! Column and row endpoints under `/api/v1/tables/:table_id`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch},
    Json, Router,
};
use serde_json::{json, Map, Value};

use super::errors::{ApiError, ApiResult};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::service::{ServiceError, TableService};

// ==================
// Shared State
// ==================

/// Table state shared across handlers
pub struct TableState {
    pub service: TableService,
    pub metrics: Arc<MetricsRegistry>,
}

impl TableState {
    pub fn new(service: TableService, metrics: Arc<MetricsRegistry>) -> Self {
        Self { service, metrics }
    }

    /// Count and log a failed request, then hand the error back
    fn reject(&self, err: ApiError, table_id: &str) -> ApiError {
        match &err {
            ApiError::Service(ServiceError::Validation(details)) => {
                self.metrics.increment_validation_failures();
                log_event!(Event::ValidationFailed, table_id, errors = details.len());
            }
            ApiError::Service(ServiceError::Storage(source)) => {
                self.metrics.increment_storage_failures();
                tracing::error!(table_id, error = %source, "table store failure");
                log_event!(Event::StorageFailed, table_id);
            }
            other => {
                self.metrics.increment_requests_rejected();
                log_event!(Event::RequestRejected, table_id, code = other.code());
            }
        }
        err
    }
}

// ==================
// Routes
// ==================

/// Create table routes
pub fn table_routes(state: Arc<TableState>) -> Router {
    Router::new()
        .route(
            "/tables/:table_id/columns",
            get(list_columns_handler).post(add_column_handler),
        )
        .route(
            "/tables/:table_id/columns/:column_key",
            delete(delete_column_handler),
        )
        .route(
            "/tables/:table_id/rows",
            get(list_rows_handler).post(add_row_handler),
        )
        .route("/tables/:table_id/rows/:row_id", delete(delete_row_handler))
        .route(
            "/tables/:table_id/rows/:row_id/cells",
            patch(update_cell_handler),
        )
        .with_state(state)
}

// ==================
// Body parsing
// ==================

fn parse_json(body: &[u8]) -> ApiResult<Value> {
    serde_json::from_slice(body).map_err(|_| ApiError::BadJson)
}

fn parse_object(body: &[u8]) -> ApiResult<Map<String, Value>> {
    match parse_json(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(ApiError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
    }
}

/// A cell update body is an object with exactly one key
fn parse_single_field(body: &[u8]) -> ApiResult<(String, Value)> {
    let single_field_error =
        || ApiError::BadRequest("Body must contain exactly one field to update".to_string());

    let Value::Object(map) = parse_json(body)? else {
        return Err(single_field_error());
    };
    if map.len() != 1 {
        return Err(single_field_error());
    }
    map.into_iter().next().ok_or_else(single_field_error)
}

// ==================
// Handlers
// ==================

async fn list_columns_handler(
    State(state): State<Arc<TableState>>,
    Path(table_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let listing = state
        .service
        .list_columns(&table_id)
        .map_err(|e| state.reject(e.into(), &table_id))?;

    Ok(Json(listing))
}

async fn add_column_handler(
    State(state): State<Arc<TableState>>,
    Path(table_id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let column = parse_json(&body)
        .and_then(|payload| Ok(state.service.add_column_payload(&table_id, &payload)?))
        .map_err(|e| state.reject(e, &table_id))?;

    state.metrics.increment_columns_added();
    log_event!(Event::ColumnAdded, table_id = %table_id, column_key = %column.key);

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "column": column }))))
}

async fn delete_column_handler(
    State(state): State<Arc<TableState>>,
    Path((table_id, column_key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .service
        .delete_column(&table_id, &column_key)
        .map_err(|e| state.reject(e.into(), &table_id))?;

    state.metrics.increment_columns_deleted();
    log_event!(Event::ColumnDeleted, table_id = %table_id, column_key = %column_key);

    Ok(StatusCode::NO_CONTENT)
}

async fn list_rows_handler(
    State(state): State<Arc<TableState>>,
    Path(table_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let rows = state
        .service
        .list_rows(&table_id)
        .map_err(|e| state.reject(e.into(), &table_id))?;

    Ok(Json(rows))
}

async fn add_row_handler(
    State(state): State<Arc<TableState>>,
    Path(table_id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let row = parse_object(&body)
        .and_then(|values| Ok(state.service.add_row(&table_id, values)?))
        .map_err(|e| state.reject(e, &table_id))?;

    state.metrics.increment_rows_added();
    log_event!(Event::RowAdded, table_id = %table_id, row_id = %row.id);

    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "row": row }))))
}

async fn update_cell_handler(
    State(state): State<Arc<TableState>>,
    Path((table_id, row_id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    // Unknown table or row wins over a malformed body
    let updated = state
        .service
        .get_row(&table_id, &row_id)
        .map_err(ApiError::from)
        .and_then(|_| parse_single_field(&body))
        .and_then(|(key, value)| {
            Ok(state.service.update_cell(&table_id, &row_id, &key, value)?)
        })
        .map_err(|e| state.reject(e, &table_id))?;

    state.metrics.increment_cells_updated();
    log_event!(Event::CellUpdated, table_id = %table_id, row_id = %row_id);

    Ok(Json(updated.flatten()))
}

async fn delete_row_handler(
    State(state): State<Arc<TableState>>,
    Path((table_id, row_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .service
        .delete_row(&table_id, &row_id)
        .map_err(|e| state.reject(e.into(), &table_id))?;

    state.metrics.increment_rows_deleted();
    log_event!(Event::RowDeleted, table_id = %table_id, row_id = %row_id);

    Ok(StatusCode::NO_CONTENT)
}
