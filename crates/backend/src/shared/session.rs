use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use super::mirror::{SharedMirror, MIRROR_STORE};
use super::voice_platform::{RemotePlatformClient, VoicePlatformApi};

/// Bearer-токен текущего запроса (кладётся в extensions middleware)
#[derive(Clone)]
pub struct PlatformSession {
    pub token: String,
}

impl PlatformSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::from_token(&self.token)
    }
}

impl fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformSession")
            .field("key", &self.key().short())
            .finish()
    }
}

/// Ключ сессии: SHA-256 токена, сам токен нигде не хранится
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn from_token(token: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(token.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Первые символы хеша для логов
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

/// Всё, что нужно сервису для работы от имени сессии
#[derive(Clone)]
pub struct SessionContext {
    pub api: Arc<dyn VoicePlatformApi>,
    pub mirror: SharedMirror,
    pub key: SessionKey,
}

impl SessionContext {
    pub async fn for_session(session: &PlatformSession) -> Self {
        let key = session.key();
        Self {
            api: Arc::new(RemotePlatformClient::new(session.token.clone())),
            mirror: MIRROR_STORE.session(&key).await,
            key,
        }
    }

    pub fn new(api: Arc<dyn VoicePlatformApi>, mirror: SharedMirror, key: SessionKey) -> Self {
        Self { api, mirror, key }
    }
}
