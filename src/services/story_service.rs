use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use std::collections::HashMap;

use crate::{
    database::MongoDB,
    models::{Story, StoryForm, StoryStatus, StoryView, User},
    utils::error::AppError,
};

const COLLECTION: &str = "stories";

fn parse_story_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest("Invalid story ID".to_string()))
}

/// Uma história privada só é visível para o próprio dono
fn is_visible_to(story: &Story, viewer_id: &str) -> bool {
    story.status == StoryStatus::Public || story.user_id == viewer_id
}

/// Mutações exigem que o usuário seja o dono da história
fn ensure_owner(story: &Story, user_id: &str) -> Result<(), AppError> {
    if story.user_id != user_id {
        return Err(AppError::Forbidden(
            "Story belongs to another user".to_string(),
        ));
    }
    Ok(())
}

/// Ordena por data de criação (mais recentes primeiro)
fn sort_newest_first(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Cria história pertencente ao usuário autenticado
pub async fn create(db: &MongoDB, user_id: &str, form: &StoryForm) -> Result<Story, AppError> {
    let collection = db.collection::<Story>(COLLECTION);

    let now = chrono::Utc::now().timestamp();
    let story = Story {
        id: None,
        user_id: user_id.to_string(),
        title: form.title.clone(),
        body: form.body.clone(),
        status: form.status,
        created_at: now,
        updated_at: now,
    };

    let result = collection
        .insert_one(&story)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut created = story;
    created.id = result.inserted_id.as_object_id();
    Ok(created)
}

/// Lista todas as histórias do usuário (dashboard, qualquer visibilidade)
pub async fn list_for_user(db: &MongoDB, user_id: &str) -> Result<Vec<Story>, AppError> {
    let collection = db.collection::<Story>(COLLECTION);

    let mut cursor = collection
        .find(doc! { "user_id": user_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut stories = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(story) => stories.push(story),
            Err(e) => {
                log::error!("❌ Erro ao processar história: {}", e);
            }
        }
    }

    sort_newest_first(&mut stories);

    Ok(stories)
}

/// Lista todas as histórias públicas com os dados do autor
pub async fn list_public(db: &MongoDB) -> Result<Vec<StoryView>, AppError> {
    collect_public(db, doc! { "status": "public" }).await
}

/// Lista as histórias públicas de um usuário específico
pub async fn list_public_by_user(db: &MongoDB, user_id: &str) -> Result<Vec<StoryView>, AppError> {
    collect_public(db, doc! { "status": "public", "user_id": user_id }).await
}

async fn collect_public(db: &MongoDB, filter: Document) -> Result<Vec<StoryView>, AppError> {
    let collection = db.collection::<Story>(COLLECTION);

    let mut cursor = collection
        .find(filter)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut stories = Vec::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(story) => stories.push(story),
            Err(e) => {
                log::error!("❌ Erro ao processar história: {}", e);
            }
        }
    }

    sort_newest_first(&mut stories);

    let authors = load_authors(db, &stories).await?;

    Ok(stories
        .into_iter()
        .map(|story| {
            let author = authors.get(&story.user_id);
            StoryView::with_author(story, author)
        })
        .collect())
}

/// Busca os autores das histórias em uma única query ($in)
async fn load_authors(db: &MongoDB, stories: &[Story]) -> Result<HashMap<String, User>, AppError> {
    let mut ids: Vec<&str> = stories.iter().map(|s| s.user_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = db.collection::<User>("users");
    let mut cursor = users
        .find(doc! { "user_id": { "$in": ids } })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let mut authors = HashMap::new();
    while let Some(result) = cursor.next().await {
        match result {
            Ok(user) => {
                authors.insert(user.user_id.clone(), user);
            }
            Err(e) => {
                log::error!("❌ Erro ao processar autor: {}", e);
            }
        }
    }

    Ok(authors)
}

/// Busca história por id; não aplica checagem de dono
pub async fn find_by_id(db: &MongoDB, id: &str) -> Result<Story, AppError> {
    let object_id = parse_story_id(id)?;
    let collection = db.collection::<Story>(COLLECTION);

    collection
        .find_one(doc! { "_id": object_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Story not found".to_string()))
}

/// Busca história aplicando a regra de visibilidade e anexa o autor
pub async fn find_visible(db: &MongoDB, id: &str, viewer_id: &str) -> Result<StoryView, AppError> {
    let story = find_by_id(db, id).await?;

    if !is_visible_to(&story, viewer_id) {
        // Histórias privadas de terceiros se comportam como inexistentes
        return Err(AppError::NotFound("Story not found".to_string()));
    }

    let users = db.collection::<User>("users");
    let author = users
        .find_one(doc! { "user_id": &story.user_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(StoryView::with_author(story, author.as_ref()))
}

/// Busca história garantindo que pertence ao usuário
pub async fn find_owned(db: &MongoDB, id: &str, user_id: &str) -> Result<Story, AppError> {
    let story = find_by_id(db, id).await?;
    ensure_owner(&story, user_id)?;
    Ok(story)
}

/// Atualiza título/corpo/visibilidade; somente o dono
pub async fn update_owned(
    db: &MongoDB,
    id: &str,
    user_id: &str,
    form: &StoryForm,
) -> Result<(), AppError> {
    let story = find_owned(db, id, user_id).await?;
    let object_id = story
        .id
        .ok_or_else(|| AppError::DatabaseError("Story missing _id".to_string()))?;

    let collection = db.collection::<Story>(COLLECTION);

    let update = doc! {
        "$set": {
            "title": &form.title,
            "body": &form.body,
            "status": form.status.as_str(),
            "updated_at": chrono::Utc::now().timestamp(),
        }
    };

    collection
        .update_one(doc! { "_id": object_id, "user_id": user_id }, update)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(())
}

/// Remove história; somente o dono
pub async fn delete_owned(db: &MongoDB, id: &str, user_id: &str) -> Result<(), AppError> {
    let story = find_owned(db, id, user_id).await?;
    let object_id = story
        .id
        .ok_or_else(|| AppError::DatabaseError("Story missing _id".to_string()))?;

    let collection = db.collection::<Story>(COLLECTION);

    let result = collection
        .delete_one(doc! { "_id": object_id, "user_id": user_id })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Story not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(user_id: &str, status: StoryStatus) -> Story {
        Story {
            id: Some(ObjectId::new()),
            user_id: user_id.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            status,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn invalid_object_id_is_rejected() {
        assert!(matches!(
            parse_story_id("not-an-oid"),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(parse_story_id(&ObjectId::new().to_hex()).is_ok());
    }

    #[test]
    fn public_stories_visible_to_everyone() {
        let s = story("owner", StoryStatus::Public);
        assert!(is_visible_to(&s, "owner"));
        assert!(is_visible_to(&s, "someone-else"));
    }

    #[test]
    fn private_stories_only_visible_to_owner() {
        let s = story("owner", StoryStatus::Private);
        assert!(is_visible_to(&s, "owner"));
        assert!(!is_visible_to(&s, "someone-else"));
    }

    #[test]
    fn mutations_require_matching_owner() {
        let s = story("owner", StoryStatus::Public);
        assert!(ensure_owner(&s, "owner").is_ok());
        assert!(matches!(
            ensure_owner(&s, "intruder"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn listings_sort_newest_first() {
        let mut stories = vec![
            story("u1", StoryStatus::Public),
            story("u2", StoryStatus::Public),
            story("u3", StoryStatus::Public),
        ];
        stories[0].created_at = 100;
        stories[1].created_at = 300;
        stories[2].created_at = 200;

        sort_newest_first(&mut stories);

        let order: Vec<i64> = stories.iter().map(|s| s.created_at).collect();
        assert_eq!(order, vec![300, 200, 100]);
    }
}
