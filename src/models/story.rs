use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::User;

/// História publicada por um usuário (armazenada no MongoDB)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// ID do usuário dono da história
    pub user_id: String,

    /// Título da história
    pub title: String,

    /// Corpo em HTML (vindo do editor)
    pub body: String,

    /// Visibilidade: public | private
    #[serde(default)]
    pub status: StoryStatus,

    /// Timestamp de criação (Unix timestamp)
    pub created_at: i64,

    /// Timestamp de última atualização
    pub updated_at: i64,
}

/// Visibilidade da história
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryStatus {
    #[default]
    Public,
    Private,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Public => "public",
            StoryStatus::Private => "private",
        }
    }
}

/// Form de criação/edição (POST /stories, PUT /stories/{id})
#[derive(Debug, Deserialize)]
pub struct StoryForm {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub status: StoryStatus,
}

/// View model entregue aos templates
#[derive(Debug, Serialize)]
pub struct StoryView {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub status: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_image: Option<String>,
}

impl From<Story> for StoryView {
    fn from(story: Story) -> Self {
        StoryView {
            id: story.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: story.user_id,
            title: story.title,
            body: story.body,
            status: story.status.as_str().to_string(),
            created_at: story.created_at,
            author_name: None,
            author_image: None,
        }
    }
}

impl StoryView {
    /// Anexa os dados do autor (para as listagens públicas e a página da história)
    pub fn with_author(story: Story, author: Option<&User>) -> Self {
        let mut view = StoryView::from(story);
        if let Some(author) = author {
            view.author_name = Some(author.display_name.clone());
            view.author_image = author.image.clone();
        }
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, doc};

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&StoryStatus::Public).unwrap(),
            "\"public\""
        );
        assert_eq!(
            serde_json::to_string(&StoryStatus::Private).unwrap(),
            "\"private\""
        );
    }

    #[test]
    fn status_defaults_to_public_when_missing() {
        let doc = doc! {
            "user_id": "abc",
            "title": "t",
            "body": "b",
            "created_at": 1i64,
            "updated_at": 1i64,
        };
        let story: Story = bson::from_document(doc).unwrap();
        assert_eq!(story.status, StoryStatus::Public);
    }

    #[test]
    fn story_bson_round_trip() {
        let story = Story {
            id: Some(ObjectId::new()),
            user_id: "user-1".to_string(),
            title: "My trip".to_string(),
            body: "<p>hello</p>".to_string(),
            status: StoryStatus::Private,
            created_at: 1700000000,
            updated_at: 1700000001,
        };
        let doc = bson::to_document(&story).unwrap();
        assert_eq!(doc.get_str("status").unwrap(), "private");
        let back: Story = bson::from_document(doc).unwrap();
        assert_eq!(back.id, story.id);
        assert_eq!(back.status, StoryStatus::Private);
        assert_eq!(back.created_at, 1700000000);
    }

    #[test]
    fn view_exposes_hex_id_and_author() {
        let oid = ObjectId::new();
        let story = Story {
            id: Some(oid),
            user_id: "user-1".to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            status: StoryStatus::Public,
            created_at: 0,
            updated_at: 0,
        };
        let author = User {
            id: None,
            user_id: "user-1".to_string(),
            google_id: "g-1".to_string(),
            display_name: "Ada Lovelace".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            image: Some("https://example.com/a.png".to_string()),
            created_at: None,
            updated_at: None,
            last_login: None,
        };
        let view = StoryView::with_author(story, Some(&author));
        assert_eq!(view.id, oid.to_hex());
        assert_eq!(view.author_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(view.author_image.as_deref(), Some("https://example.com/a.png"));
    }
}
