use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::handlers;
use crate::system;

/// Загрузка файлов базы знаний, байт
const KNOWLEDGE_BASE_UPLOAD_LIMIT: usize = 50 * 1024 * 1024;

/// Все маршруты API
pub fn configure_routes() -> Router {
    let session = middleware::from_fn(system::auth::middleware::require_session);

    // ========================================
    // PROTECTED ROUTES (Authorization: Bearer <platform token>)
    // ========================================
    let protected = Router::new()
        .route(
            "/api/system/auth/logout",
            post(system::handlers::auth::logout),
        )
        // Agents
        .route(
            "/api/a001-agent",
            get(handlers::a001_agent::list_all).post(handlers::a001_agent::create),
        )
        .route(
            "/api/a001-agent/:id",
            get(handlers::a001_agent::get_by_id)
                .patch(handlers::a001_agent::update)
                .delete(handlers::a001_agent::delete),
        )
        // LLM configurations
        .route(
            "/api/a002-llm-config",
            get(handlers::a002_llm_config::list_all).post(handlers::a002_llm_config::create),
        )
        .route(
            "/api/a002-llm-config/sanitize",
            post(handlers::a002_llm_config::sanitize),
        )
        .route(
            "/api/a002-llm-config/:id",
            get(handlers::a002_llm_config::get_by_id)
                .patch(handlers::a002_llm_config::update)
                .delete(handlers::a002_llm_config::delete),
        )
        .route(
            "/api/a002-llm-config/:id/form",
            get(handlers::a002_llm_config::get_form),
        )
        // Knowledge bases
        .route(
            "/api/a003-knowledge-base",
            get(handlers::a003_knowledge_base::list_all)
                .post(handlers::a003_knowledge_base::create)
                .layer(DefaultBodyLimit::max(KNOWLEDGE_BASE_UPLOAD_LIMIT)),
        )
        .route(
            "/api/a003-knowledge-base/:id",
            axum::routing::delete(handlers::a003_knowledge_base::delete),
        )
        // Phone numbers
        .route(
            "/api/a004-phone-number",
            get(handlers::a004_phone_number::list_all).post(handlers::a004_phone_number::create),
        )
        .route(
            "/api/a004-phone-number/:number",
            axum::routing::patch(handlers::a004_phone_number::update)
                .delete(handlers::a004_phone_number::delete),
        )
        // Calls
        .route("/api/a005-call/web", post(handlers::a005_call::create_web_call))
        .route(
            "/api/a005-call/phone",
            post(handlers::a005_call::create_phone_call),
        )
        .route("/api/a005-call/list", post(handlers::a005_call::list))
        .route("/api/a005-call/:id", get(handlers::a005_call::get_by_id))
        .route("/api/a005-call/:id/end", post(handlers::a005_call::end_call))
        .route(
            "/api/a005-call/:id/watch",
            get(handlers::a005_call::watch).delete(handlers::a005_call::stop_watch),
        )
        .layer(session);

    // ========================================
    // PUBLIC ROUTES
    // ========================================
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route(
            "/api/system/auth/login",
            post(system::handlers::auth::login),
        )
        .route(
            "/api/system/auth/signup",
            post(system::handlers::auth::signup),
        )
        .merge(protected)
}
