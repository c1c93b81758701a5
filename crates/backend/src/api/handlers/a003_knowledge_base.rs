use axum::{
    extract::{Multipart, Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a003_knowledge_base::aggregate::KnowledgeBase;
use contracts::domain::a003_knowledge_base::form::{KnowledgeBaseForm, KnowledgeBaseTab, UploadFile};

use super::ListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::a003_knowledge_base;
use crate::system::auth::extractor::CurrentSession;

/// GET /api/a003-knowledge-base
pub async fn list_all(
    CurrentSession(ctx): CurrentSession,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<KnowledgeBase>> {
    Ok(Json(
        a003_knowledge_base::service::list_all(&ctx, params.cached).await?,
    ))
}

/// POST /api/a003-knowledge-base (multipart/form-data)
///
/// Поля: `knowledge_base_name`, `active_tab` (text | files | url),
/// `text_title`, `text`, `url`, файлы в `files`.
pub async fn create(
    CurrentSession(ctx): CurrentSession,
    multipart: Multipart,
) -> ApiResult<KnowledgeBase> {
    let form = read_form(multipart).await?;
    Ok(Json(a003_knowledge_base::service::create(&ctx, form).await?))
}

/// DELETE /api/a003-knowledge-base/:id
pub async fn delete(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    a003_knowledge_base::service::delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_form(mut multipart: Multipart) -> Result<KnowledgeBaseForm, ApiError> {
    let mut form = KnowledgeBaseForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "files" | "knowledge_base_files" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Cannot read file '{}': {}", file_name, e)))?;
                form.files.push(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Cannot read field '{}': {}", name, e)))?;
                apply_text_field(&mut form, &name, value)?;
            }
        }
    }

    Ok(form)
}

fn apply_text_field(form: &mut KnowledgeBaseForm, name: &str, value: String) -> Result<(), ApiError> {
    match name {
        "knowledge_base_name" => form.knowledge_base_name = value,
        "active_tab" => form.active_tab = parse_tab(&value)?,
        "text_title" => form.text_title = value,
        "text" => form.text = value,
        "url" => form.url = value,
        other => tracing::debug!("Ignoring unknown knowledge base field '{}'", other),
    }
    Ok(())
}

fn parse_tab(value: &str) -> Result<KnowledgeBaseTab, ApiError> {
    match value.trim() {
        "text" => Ok(KnowledgeBaseTab::Text),
        "files" => Ok(KnowledgeBaseTab::Files),
        "url" => Ok(KnowledgeBaseTab::Url),
        other => Err(ApiError::bad_request(format!("Unknown tab: {}", other))),
    }
}
