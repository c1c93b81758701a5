use contracts::domain::a003_knowledge_base::aggregate::KnowledgeBase;
use contracts::domain::a003_knowledge_base::form::KnowledgeBaseForm;

use crate::shared::session::SessionContext;
use crate::shared::voice_platform::{KnowledgeBaseMultipart, PlatformError};

pub async fn list_all(ctx: &SessionContext, cached: bool) -> Result<Vec<KnowledgeBase>, PlatformError> {
    if cached {
        let mirror = ctx.mirror.lock().await;
        if mirror.knowledge_bases.is_loaded() {
            return Ok(mirror.knowledge_bases.items().to_vec());
        }
    }

    let bases = ctx.api.list_knowledge_bases().await?;
    ctx.mirror.lock().await.knowledge_bases.replace_all(bases.clone());
    Ok(bases)
}

/// Создание базы знаний из активной вкладки формы.
/// Ошибка проверки возвращается до любого сетевого запроса.
pub async fn create(ctx: &SessionContext, form: KnowledgeBaseForm) -> Result<KnowledgeBase, PlatformError> {
    let submission = form
        .into_submission()
        .map_err(|e| PlatformError::Validation(e.to_string()))?;

    let body = KnowledgeBaseMultipart::from_submission(submission);
    tracing::info!(
        "Creating knowledge base ({} parts, {} files)",
        body.parts.len(),
        body.file_count()
    );

    let kb = ctx.api.create_knowledge_base(body).await?;
    ctx.mirror.lock().await.knowledge_bases.upsert(kb.clone());
    Ok(kb)
}

pub async fn delete(ctx: &SessionContext, id: &str) -> Result<(), PlatformError> {
    ctx.api.delete_knowledge_base(id).await?;
    ctx.mirror.lock().await.knowledge_bases.remove(id);
    tracing::info!("Knowledge base deleted: {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::voice_platform::mock::{context, MockPlatform};
    use crate::shared::voice_platform::multipart::{FIELD_FILES, FIELD_TEXTS};
    use contracts::domain::a003_knowledge_base::form::{KnowledgeBaseTab, UploadFile};
    use serde_json::json;
    use std::sync::Arc;

    fn text_form(text: &str) -> KnowledgeBaseForm {
        KnowledgeBaseForm {
            knowledge_base_name: "Clinic FAQ".into(),
            active_tab: KnowledgeBaseTab::Text,
            text_title: "Opening hours".into(),
            text: text.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_text_fails_without_request() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);

        let err = create(&ctx, text_form("   ")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(mock.requests().is_empty());
        assert!(ctx.mirror.lock().await.knowledge_bases.items().is_empty());
    }

    #[tokio::test]
    async fn test_text_sends_single_entry() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);

        let kb = create(&ctx, text_form("Mon-Fri 9-18")).await.unwrap();

        assert_eq!(mock.count("create_knowledge_base"), 1);
        let bodies = mock.kb_bodies.lock().unwrap();
        let texts: serde_json::Value =
            serde_json::from_str(bodies[0].text(FIELD_TEXTS).unwrap()).unwrap();
        assert_eq!(texts, json!([{"title": "Opening hours", "text": "Mon-Fri 9-18"}]));
        assert_eq!(bodies[0].file_count(), 0);

        let mirror = ctx.mirror.lock().await;
        assert_eq!(mirror.knowledge_bases.items()[0].knowledge_base_id, kb.knowledge_base_id);
        assert_eq!(kb.knowledge_base_name, "Clinic FAQ");
    }

    #[tokio::test]
    async fn test_only_active_tab_is_sent() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);

        let form = KnowledgeBaseForm {
            knowledge_base_name: "Manuals".into(),
            active_tab: KnowledgeBaseTab::Files,
            text: "left over from the text tab".into(),
            files: vec![UploadFile {
                file_name: "manual.pdf".into(),
                content_type: Some("application/pdf".into()),
                bytes: vec![0x25, 0x50, 0x44, 0x46],
            }],
            ..Default::default()
        };
        create(&ctx, form).await.unwrap();

        let bodies = mock.kb_bodies.lock().unwrap();
        assert!(bodies[0].text(FIELD_TEXTS).is_none());
        assert_eq!(bodies[0].file_count(), 1);
        assert!(bodies[0].parts.iter().any(|p| p.name == FIELD_FILES));
    }

    #[tokio::test]
    async fn test_delete_removes_from_mirror() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);
        let first = create(&ctx, text_form("a")).await.unwrap();
        let second = create(&ctx, text_form("b")).await.unwrap();

        delete(&ctx, &first.knowledge_base_id).await.unwrap();

        assert_eq!(mock.count("delete_knowledge_base"), 1);
        let mirror = ctx.mirror.lock().await;
        assert_eq!(mirror.knowledge_bases.items().len(), 1);
        assert_eq!(mirror.knowledge_bases.items()[0].knowledge_base_id, second.knowledge_base_id);
    }
}
