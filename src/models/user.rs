use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Usuário autenticado via Google (armazenado no MongoDB)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String, // PRIMARY IDENTIFIER - matches MongoDB structure
    pub google_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub created_at: Option<BsonDateTime>,
    pub updated_at: Option<BsonDateTime>,
    pub last_login: Option<BsonDateTime>,
}

/// Dados do usuário guardados no cookie de sessão
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionUser {
    pub user_id: String,
    pub display_name: String,
    pub first_name: String,
    pub image: Option<String>,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        SessionUser {
            user_id: user.user_id.clone(),
            display_name: user.display_name.clone(),
            first_name: user.first_name.clone(),
            image: user.image.clone(),
        }
    }
}
