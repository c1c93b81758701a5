use contracts::domain::a004_phone_number::aggregate::{
    PhoneNumber, PhoneNumberCreateRequest, PhoneNumberUpdateRequest,
};

use crate::shared::session::SessionContext;
use crate::shared::voice_platform::PlatformError;

pub async fn list_all(ctx: &SessionContext, cached: bool) -> Result<Vec<PhoneNumber>, PlatformError> {
    if cached {
        let mirror = ctx.mirror.lock().await;
        if mirror.phone_numbers.is_loaded() {
            return Ok(mirror.phone_numbers.items().to_vec());
        }
    }

    let numbers = ctx.api.list_phone_numbers().await?;
    ctx.mirror.lock().await.phone_numbers.replace_all(numbers.clone());
    Ok(numbers)
}

/// Покупка номера
pub async fn create(
    ctx: &SessionContext,
    request: PhoneNumberCreateRequest,
) -> Result<PhoneNumber, PlatformError> {
    request.validate().map_err(PlatformError::Validation)?;

    let number = ctx.api.create_phone_number(&request).await?;
    tracing::info!("Phone number purchased: {}", number.phone_number);
    ctx.mirror.lock().await.phone_numbers.upsert(number.clone());
    Ok(number)
}

/// Псевдоним и привязка входящего/исходящего агента
pub async fn update(
    ctx: &SessionContext,
    phone_number: &str,
    request: PhoneNumberUpdateRequest,
) -> Result<PhoneNumber, PlatformError> {
    request.validate().map_err(PlatformError::Validation)?;

    let number = ctx.api.update_phone_number(phone_number, &request).await?;
    ctx.mirror.lock().await.phone_numbers.upsert(number.clone());
    Ok(number)
}

pub async fn delete(ctx: &SessionContext, phone_number: &str) -> Result<(), PlatformError> {
    ctx.api.delete_phone_number(phone_number).await?;
    ctx.mirror.lock().await.phone_numbers.remove(phone_number);
    tracing::info!("Phone number released: {}", phone_number);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::voice_platform::mock::{context, sample_phone_number, MockPlatform};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_validates_area_code() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);

        let err = create(
            &ctx,
            PhoneNumberCreateRequest {
                area_code: Some(41),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_validation());
        assert!(mock.requests().is_empty());

        let number = create(
            &ctx,
            PhoneNumberCreateRequest {
                area_code: Some(415),
                nickname: Some("Front desk".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(number.area_code, Some(415));
        assert_eq!(ctx.mirror.lock().await.phone_numbers.items().len(), 1);
    }

    #[tokio::test]
    async fn test_bind_agents() {
        let mock = Arc::new(MockPlatform::new());
        mock.phone_numbers
            .lock()
            .unwrap()
            .push(sample_phone_number("+14155550100"));
        let ctx = context(&mock);
        list_all(&ctx, false).await.unwrap();

        let updated = update(
            &ctx,
            "+14155550100",
            PhoneNumberUpdateRequest {
                inbound_agent_id: Some(Some("agent_in".into())),
                outbound_agent_id: Some(Some("agent_out".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.inbound_agent_id.as_deref(), Some("agent_in"));

        let mirror = ctx.mirror.lock().await;
        let mirrored = mirror.phone_numbers.get("+14155550100").unwrap();
        assert_eq!(mirrored.outbound_agent_id.as_deref(), Some("agent_out"));
    }

    #[tokio::test]
    async fn test_unbind_inbound_agent() {
        let mock = Arc::new(MockPlatform::new());
        let mut number = sample_phone_number("+14155550100");
        number.inbound_agent_id = Some("agent_in".into());
        number.outbound_agent_id = Some("agent_out".into());
        mock.phone_numbers.lock().unwrap().push(number);
        let ctx = context(&mock);

        let request: PhoneNumberUpdateRequest =
            serde_json::from_value(serde_json::json!({"inbound_agent_id": null})).unwrap();
        let updated = update(&ctx, "+14155550100", request).await.unwrap();

        assert_eq!(mock.count("update_phone_number"), 1);
        assert_eq!(updated.inbound_agent_id, None);
        assert_eq!(updated.outbound_agent_id.as_deref(), Some("agent_out"));
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let mock = Arc::new(MockPlatform::new());
        let ctx = context(&mock);
        let err = update(&ctx, "+14155550100", PhoneNumberUpdateRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(mock.requests().is_empty());
    }
}
