use actix_web::{web, HttpResponse};
use handlebars::Handlebars;
use serde_json::json;

use crate::database::MongoDB;
use crate::models::{SessionUser, StoryView};
use crate::services::story_service;
use crate::utils::render;

/// GET / - Página de login (somente visitantes)
pub async fn login_page(hb: web::Data<Handlebars<'_>>) -> HttpResponse {
    render::render_page(&hb, "login", &json!({}))
}

/// GET /dashboard - Painel com as histórias do usuário
pub async fn dashboard(
    user: web::ReqData<SessionUser>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();

    match story_service::list_for_user(&db, &user.user_id).await {
        Ok(stories) => {
            let stories: Vec<StoryView> = stories.into_iter().map(StoryView::from).collect();
            render::render_page(
                &hb,
                "dashboard",
                &json!({
                    "name": &user.first_name,
                    "user": &user,
                    "stories": stories,
                }),
            )
        }
        Err(e) => {
            log::error!("❌ Failed to load dashboard: {}", e);
            render::render_500(&hb)
        }
    }
}
