//! Image upload handlers.
//!
//! ```text
//! POST /api/upload      {"fileName":"tower.png","contentType":"image/png","dataBase64":"iVBOR..."}
//! GET  /uploads/{name}
//! ```

use actix_web::{HttpResponse, get, http::header, post, web};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, ImageUpload, ImageUploadError, content_type_for};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Largest JSON body accepted anywhere: a maximum-size image after base64
/// expansion, plus room for the other fields.
pub const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
}

fn upload_rejected(err: ImageUploadError) -> Error {
    let reason = match err {
        ImageUploadError::NotAnImage { .. } => "not_an_image",
        ImageUploadError::UnsupportedType { .. } => "unsupported_image_type",
        ImageUploadError::Empty => "empty_upload",
        ImageUploadError::TooLarge { .. } => "upload_too_large",
    };
    Error::invalid_request(err.to_string()).with_reason(reason)
}

/// Decode the payload, tolerating a `data:<type>;base64,` prefix.
fn decode_payload(raw: &str) -> Result<Vec<u8>, Error> {
    let encoded = match raw.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    };
    STANDARD.decode(encoded.trim()).map_err(|err| {
        Error::invalid_request(format!("image data is not valid base64: {err}"))
            .with_field("dataBase64")
    })
}

/// Store a listing image and return its public URL.
#[post("/upload")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UploadRequest>,
) -> ApiResult<web::Json<UploadResponse>> {
    session.require_principal()?;
    let request = payload.into_inner();
    let bytes = decode_payload(&request.data_base64)?;
    let upload =
        ImageUpload::new(&request.file_name, &request.content_type, bytes).map_err(upload_rejected)?;
    let stored = state.images.store(&upload).await.map_err(Error::from)?;
    Ok(web::Json(UploadResponse {
        image_url: stored.uri,
    }))
}

/// Serve a stored image, sandboxed and with sniffing disabled.
#[get("/uploads/{name}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let name = path.into_inner();
    let bytes = state
        .images
        .fetch(&name)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::not_found("image not found"))?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type_for(&name)))
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .insert_header((
            header::CONTENT_SECURITY_POLICY,
            "default-src 'none'; sandbox",
        ))
        .body(bytes))
}
