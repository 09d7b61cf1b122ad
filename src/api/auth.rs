use actix_session::Session;
use actix_web::{web, HttpResponse};
use handlebars::Handlebars;
use serde::Deserialize;

use crate::database::MongoDB;
use crate::middleware::auth::SESSION_USER_KEY;
use crate::models::SessionUser;
use crate::services::auth_service;
use crate::utils::render;

/// Chave do state OAuth dentro da sessão (CSRF)
const OAUTH_STATE_KEY: &str = "oauth_state";

/// GET /auth/google - Redireciona para a tela de consentimento do Google
pub async fn google_auth(session: Session, hb: web::Data<Handlebars<'_>>) -> HttpResponse {
    log::info!("🔐 GET /auth/google - Generating OAuth URL");

    match auth_service::generate_google_oauth_url() {
        Ok(auth) => {
            if let Err(e) = session.insert(OAUTH_STATE_KEY, &auth.state) {
                log::error!("❌ Failed to store OAuth state: {}", e);
                return render::render_500(&hb);
            }
            HttpResponse::Found()
                .append_header(("Location", auth.auth_url))
                .finish()
        }
        Err(e) => {
            log::error!("❌ Failed to generate Google OAuth URL: {}", e);
            render::render_500(&hb)
        }
    }
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// GET /auth/google/callback - Troca o código por perfil e abre a sessão
pub async fn google_callback(
    db: web::Data<MongoDB>,
    session: Session,
    query: web::Query<CallbackQuery>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    log::info!("🔐 GET /auth/google/callback - Processing Google OAuth");

    if let Some(error) = &query.error {
        log::error!("❌ OAuth error: {}", error);
        return HttpResponse::Found()
            .append_header(("Location", "/"))
            .finish();
    }

    // Valida o state contra a sessão (CSRF)
    let expected_state: Option<String> = session
        .remove_as(OAUTH_STATE_KEY)
        .and_then(|result| result.ok());
    match (&query.state, expected_state) {
        (Some(received), Some(expected)) if *received == expected => {}
        _ => {
            log::warn!("⚠️  OAuth state mismatch");
            return HttpResponse::Found()
                .append_header(("Location", "/"))
                .finish();
        }
    }

    let code = match &query.code {
        Some(c) => c,
        None => {
            log::error!("❌ No authorization code provided");
            return HttpResponse::Found()
                .append_header(("Location", "/"))
                .finish();
        }
    };

    match auth_service::handle_google_callback(&db, code).await {
        Ok(user) => {
            log::info!("✅ Google OAuth successful: {}", user.user_id);

            session.renew();
            if let Err(e) = session.insert(SESSION_USER_KEY, SessionUser::from(&user)) {
                log::error!("❌ Failed to persist session: {}", e);
                return render::render_500(&hb);
            }

            HttpResponse::Found()
                .append_header(("Location", "/dashboard"))
                .finish()
        }
        Err(e) => {
            log::error!("❌ Google OAuth failed: {}", e);
            render::render_500(&hb)
        }
    }
}

/// GET /auth/logout - Encerra a sessão
pub async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Found()
        .append_header(("Location", "/"))
        .finish()
}
