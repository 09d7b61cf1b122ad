use actix_web::{web, HttpResponse};
use handlebars::Handlebars;
use serde_json::json;

use crate::database::MongoDB;
use crate::models::{SessionUser, StoryForm, StoryView};
use crate::services::story_service;
use crate::utils::{error::AppError, render};

/// GET /stories - Lista todas as histórias públicas
pub async fn index(
    user: web::ReqData<SessionUser>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();

    match story_service::list_public(&db).await {
        Ok(stories) => render::render_page(
            &hb,
            "stories/index",
            &json!({
                "user": user,
                "stories": stories,
            }),
        ),
        Err(e) => {
            log::error!("❌ Failed to fetch public stories: {}", e);
            render::render_500(&hb)
        }
    }
}

/// GET /stories/add - Formulário de nova história
pub async fn add_form(
    user: web::ReqData<SessionUser>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    render::render_page(&hb, "stories/add", &json!({ "user": user.into_inner() }))
}

/// POST /stories - Cria história pertencente ao usuário autenticado
pub async fn create(
    user: web::ReqData<SessionUser>,
    form: web::Form<StoryForm>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();

    match story_service::create(&db, &user.user_id, &form).await {
        Ok(story) => {
            log::info!(
                "✅ Story created: {} by {}",
                story.id.map(|id| id.to_hex()).unwrap_or_default(),
                user.user_id
            );
            HttpResponse::Found()
                .append_header(("Location", "/dashboard"))
                .finish()
        }
        Err(e) => {
            log::error!("❌ Failed to create story: {}", e);
            render::render_500(&hb)
        }
    }
}

/// GET /stories/{id} - Exibe a história (privadas só para o dono)
pub async fn show(
    user: web::ReqData<SessionUser>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();
    let story_id = path.into_inner();

    match story_service::find_visible(&db, &story_id, &user.user_id).await {
        Ok(story) => render::render_page(
            &hb,
            "stories/show",
            &json!({
                "user": user,
                "story": story,
            }),
        ),
        Err(AppError::NotFound(_)) | Err(AppError::InvalidRequest(_)) => render::render_404(&hb),
        Err(e) => {
            log::error!("❌ Failed to fetch story {}: {}", story_id, e);
            render::render_500(&hb)
        }
    }
}

/// GET /stories/edit/{id} - Formulário de edição (somente o dono)
pub async fn edit_form(
    user: web::ReqData<SessionUser>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();
    let story_id = path.into_inner();

    match story_service::find_owned(&db, &story_id, &user.user_id).await {
        Ok(story) => render::render_page(
            &hb,
            "stories/edit",
            &json!({
                "user": user,
                "story": StoryView::from(story),
            }),
        ),
        Err(AppError::Forbidden(_)) => HttpResponse::Found()
            .append_header(("Location", "/stories"))
            .finish(),
        Err(AppError::NotFound(_)) | Err(AppError::InvalidRequest(_)) => render::render_404(&hb),
        Err(e) => {
            log::error!("❌ Failed to fetch story {}: {}", story_id, e);
            render::render_500(&hb)
        }
    }
}

/// PUT /stories/{id} - Atualiza a história (somente o dono)
pub async fn update(
    user: web::ReqData<SessionUser>,
    path: web::Path<String>,
    form: web::Form<StoryForm>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();
    let story_id = path.into_inner();

    match story_service::update_owned(&db, &story_id, &user.user_id, &form).await {
        Ok(()) => HttpResponse::Found()
            .append_header(("Location", "/dashboard"))
            .finish(),
        Err(AppError::Forbidden(_)) => {
            log::warn!(
                "⚠️  User {} tried to update story {} owned by someone else",
                user.user_id,
                story_id
            );
            HttpResponse::Found()
                .append_header(("Location", "/stories"))
                .finish()
        }
        Err(AppError::NotFound(_)) | Err(AppError::InvalidRequest(_)) => render::render_404(&hb),
        Err(e) => {
            log::error!("❌ Failed to update story {}: {}", story_id, e);
            render::render_500(&hb)
        }
    }
}

/// DELETE /stories/{id} - Remove a história (somente o dono)
pub async fn delete(
    user: web::ReqData<SessionUser>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();
    let story_id = path.into_inner();

    match story_service::delete_owned(&db, &story_id, &user.user_id).await {
        Ok(()) => HttpResponse::Found()
            .append_header(("Location", "/dashboard"))
            .finish(),
        Err(AppError::Forbidden(_)) => {
            log::warn!(
                "⚠️  User {} tried to delete story {} owned by someone else",
                user.user_id,
                story_id
            );
            HttpResponse::Found()
                .append_header(("Location", "/stories"))
                .finish()
        }
        Err(AppError::NotFound(_)) | Err(AppError::InvalidRequest(_)) => render::render_404(&hb),
        Err(e) => {
            log::error!("❌ Failed to delete story {}: {}", story_id, e);
            render::render_500(&hb)
        }
    }
}

/// GET /stories/user/{user_id} - Histórias públicas de um usuário
pub async fn user_stories(
    user: web::ReqData<SessionUser>,
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    hb: web::Data<Handlebars<'_>>,
) -> HttpResponse {
    let user = user.into_inner();
    let author_id = path.into_inner();

    match story_service::list_public_by_user(&db, &author_id).await {
        Ok(stories) => render::render_page(
            &hb,
            "stories/index",
            &json!({
                "user": user,
                "stories": stories,
            }),
        ),
        Err(e) => {
            log::error!("❌ Failed to fetch stories for user {}: {}", author_id, e);
            render::render_500(&hb)
        }
    }
}
