//! Request handlers. Every response body is an [`ApiEnvelope`].

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use resolvekit_classifier::ClassifyContext;
use resolvekit_shared::{
    ApiEnvelope, DocumentFragment, ResolveKitError, StructuredComplaintDocument,
};
use resolvekit_storage::{BundleOutcome, SeoUpsert};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::error::ApiResult;
use crate::state::AppState;

type Shared = State<Arc<AppState>>;

pub async fn health() -> Json<Value> {
    Json(json!({ "success": true, "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Structured complaints
// ---------------------------------------------------------------------------

/// Optional display name substituted into the main-heading description.
#[derive(Debug, Default, Deserialize)]
pub struct EntityParams {
    pub entity: Option<String>,
}

impl EntityParams {
    fn context(self) -> ClassifyContext {
        match self.entity {
            Some(name) if !name.trim().is_empty() => ClassifyContext::for_entity(name),
            _ => ClassifyContext::default(),
        }
    }
}

pub async fn get_complaint(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<StructuredComplaintDocument>>> {
    let doc = state.storage.get_complaint(&id).await?;
    Ok(Json(ApiEnvelope::ok(doc)))
}

#[instrument(skip(state, params, payload))]
pub async fn save_complaint(
    State(state): Shared,
    Path(id): Path<String>,
    params: Result<Query<EntityParams>, QueryRejection>,
    payload: Result<Json<DocumentFragment>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<StructuredComplaintDocument>>> {
    let Query(params) = params?;
    let Json(fragment) = payload?;

    let doc = state.pipeline.apply_fragment(fragment, &params.context());
    let stored = state.storage.upsert_complaint(&id, &doc).await?;
    info!(entity_id = %id, status = %stored.processing_status, "complaint saved");
    Ok(Json(ApiEnvelope::ok(Some(stored))))
}

pub async fn delete_complaint(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let deleted = state.storage.delete_complaint(&id).await?;
    info!(entity_id = %id, deleted, "complaint delete");
    Ok(Json(ApiEnvelope::ok(None)))
}

#[derive(Debug, Deserialize)]
pub struct BundleRequest {
    pub document: StructuredComplaintDocument,
    #[serde(default)]
    pub seo: Option<SeoUpsert>,
}

#[instrument(skip(state, payload))]
pub async fn save_bundle(
    State(state): Shared,
    Path(id): Path<String>,
    payload: Result<Json<BundleRequest>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<BundleOutcome>>> {
    let Json(request) = payload?;
    let outcome = state
        .storage
        .save_bundle(&id, &request.document, request.seo.as_ref())
        .await?;
    Ok(Json(ApiEnvelope::ok(Some(outcome))))
}

// ---------------------------------------------------------------------------
// SEO settings
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SeoParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub identifier: Option<String>,
    pub path: Option<String>,
    pub tab: Option<String>,
}

/// Identifier lookup through the tolerance ladder, else a path lookup.
#[instrument(skip(state, params))]
pub async fn get_seo(
    State(state): Shared,
    params: Result<Query<SeoParams>, QueryRejection>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let Query(params) = params?;
    let tab = params.tab.as_deref().filter(|t| !t.is_empty());

    let flattened = match (params.identifier.as_deref(), params.path.as_deref()) {
        (Some(identifier), _) if !identifier.is_empty() => {
            let kind = params
                .kind
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| ResolveKitError::validation("identifier lookup needs a type"))?;
            state
                .storage
                .find_seo(kind, identifier)
                .await?
                .map(|hit| hit.flatten(tab))
        }
        (_, Some(path)) if !path.is_empty() => state
            .storage
            .find_seo_by_path(params.kind.as_deref().filter(|k| !k.is_empty()), path)
            .await?
            .map(|settings| settings.flatten(tab)),
        _ => {
            return Err(ResolveKitError::validation("either identifier or path is required").into());
        }
    };
    Ok(Json(ApiEnvelope::ok(flattened)))
}

#[instrument(skip(state, payload))]
pub async fn upsert_seo(
    State(state): Shared,
    payload: Result<Json<SeoUpsert>, JsonRejection>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let Json(upsert) = payload?;
    let settings = state.storage.upsert_seo(&upsert).await?;
    Ok(Json(ApiEnvelope::ok(Some(
        settings.flatten(upsert.tab.as_deref()),
    ))))
}

pub async fn delete_seo(
    State(state): Shared,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiEnvelope<Value>>> {
    let deleted = state.storage.delete_seo(&id).await?;
    info!(id = %id, deleted, "seo delete");
    Ok(Json(ApiEnvelope::ok(None)))
}
