use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse};
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};
use voicebrief_common::VoiceBriefError;

use crate::artifact::UploadArtifact;
use crate::error::ApiError;
use crate::state::AppState;
use crate::types::TranscribeQuery;

/// Largest `whisper_model` form value accepted
const MAX_FIELD_BYTES: usize = 256;

/// POST /transcribe_summarize - transcribe an upload and summarize the transcript
#[post("/transcribe_summarize")]
pub async fn transcribe_summarize(
    mut payload: Multipart,
    query: web::Query<TranscribeQuery>,
    state: web::Data<Arc<AppState>>,
) -> Result<HttpResponse, ApiError> {
    let mut upload: Option<(UploadArtifact, String)> = None;
    let mut form_model: Option<String> = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(multipart_error)?;
        let content_disposition = field.content_disposition();
        let name = content_disposition.get_name().unwrap_or_default().to_string();
        let filename = content_disposition.get_filename().map(str::to_string);

        match name.as_str() {
            "file" if upload.is_none() => {
                let artifact = state
                    .pipeline
                    .persist(filename.as_deref(), &mut field)
                    .await?;
                // persist rejects empty names, so this is always set here
                upload = Some((artifact, filename.unwrap_or_default()));
            }
            "whisper_model" => {
                let mut value = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(multipart_error)?;
                    if value.len() + chunk.len() > MAX_FIELD_BYTES {
                        return Err(VoiceBriefError::invalid_input("whisper_model is too long").into());
                    }
                    value.extend_from_slice(&chunk);
                }
                form_model = Some(String::from_utf8_lossy(&value).trim().to_string());
            }
            other => {
                debug!("Ignoring multipart field '{}'", other);
                while let Some(chunk) = field.next().await {
                    chunk.map_err(multipart_error)?;
                }
            }
        }
    }

    let (artifact, filename) =
        upload.ok_or_else(|| VoiceBriefError::invalid_input("No file uploaded"))?;

    let model = form_model
        .filter(|m| !m.is_empty())
        .or_else(|| query.into_inner().whisper_model);

    info!("Processing upload {}", filename);
    let result = state
        .pipeline
        .process_detached(artifact, filename, model)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

fn multipart_error(e: actix_multipart::MultipartError) -> ApiError {
    VoiceBriefError::invalid_input(format!("Invalid multipart body: {}", e)).into()
}
