use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use uuid::Uuid;

use crate::{database::MongoDB, models::User};

/// URL de autorização do Google + state para proteção CSRF
#[derive(Debug)]
pub struct GoogleAuthUrl {
    pub auth_url: String,
    pub state: String,
}

/// Perfil retornado pelo endpoint userinfo do Google
#[derive(Debug, PartialEq)]
pub struct GoogleProfile {
    pub google_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
}

fn get_redirect_uri() -> String {
    std::env::var("GOOGLE_REDIRECT_URI")
        .unwrap_or_else(|_| "http://localhost:3002/auth/google/callback".to_string())
}

// Generate Google OAuth URL
pub fn generate_google_oauth_url() -> Result<GoogleAuthUrl, String> {
    let client_id = std::env::var("GOOGLE_CLIENT_ID")
        .map_err(|_| "GOOGLE_CLIENT_ID not configured".to_string())?;

    let redirect_uri = get_redirect_uri();

    // Generate state for CSRF protection
    let state = Uuid::new_v4().to_string();

    let params = vec![
        ("client_id", client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", "openid email profile"),
        ("state", state.as_str()),
        ("prompt", "select_account"),
    ];

    let query_string = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let auth_url = format!("https://accounts.google.com/o/oauth2/v2/auth?{}", query_string);

    Ok(GoogleAuthUrl { auth_url, state })
}

// Handle Google OAuth callback: troca o código, busca o perfil e faz find-or-create
pub async fn handle_google_callback(db: &MongoDB, code: &str) -> Result<User, String> {
    let client_id = std::env::var("GOOGLE_CLIENT_ID")
        .map_err(|_| "GOOGLE_CLIENT_ID not configured".to_string())?;
    let client_secret = std::env::var("GOOGLE_CLIENT_SECRET")
        .map_err(|_| "GOOGLE_CLIENT_SECRET not configured".to_string())?;
    let redirect_uri = get_redirect_uri();

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let token_response = client
        .post("https://oauth2.googleapis.com/token")
        .form(&[
            ("code", code),
            ("client_id", &client_id),
            ("client_secret", &client_secret),
            ("redirect_uri", &redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(|e| format!("Failed to exchange code: {}", e))?;

    if !token_response.status().is_success() {
        return Err("Failed to exchange authorization code".to_string());
    }

    let tokens: serde_json::Value = token_response
        .json()
        .await
        .map_err(|e| format!("Failed to parse token response: {}", e))?;

    let access_token = tokens["access_token"]
        .as_str()
        .ok_or_else(|| "No access token in response".to_string())?;

    // Get user info
    let user_info_response = client
        .get("https://www.googleapis.com/oauth2/v2/userinfo")
        .header("Authorization", format!("Bearer {}", access_token))
        .send()
        .await
        .map_err(|e| format!("Failed to get user info: {}", e))?;

    let user_info: serde_json::Value = user_info_response
        .json()
        .await
        .map_err(|e| format!("Failed to parse user info: {}", e))?;

    let profile = profile_from_userinfo(&user_info)?;

    find_or_create_user(db, profile).await
}

/// Extrai os campos do perfil do JSON do userinfo
fn profile_from_userinfo(user_info: &serde_json::Value) -> Result<GoogleProfile, String> {
    let google_id = user_info["id"]
        .as_str()
        .ok_or_else(|| "No id in user info".to_string())?
        .to_string();
    let display_name = user_info["name"].as_str().unwrap_or_default().to_string();
    let first_name = user_info["given_name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let last_name = user_info["family_name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let image = user_info["picture"].as_str().map(String::from);

    Ok(GoogleProfile {
        google_id,
        display_name,
        first_name,
        last_name,
        image,
    })
}

/// Busca o usuário pelo subject do Google; cria no primeiro login
async fn find_or_create_user(db: &MongoDB, profile: GoogleProfile) -> Result<User, String> {
    let collection = db.collection::<User>("users");

    let filter = doc! { "google_id": &profile.google_id };

    if let Some(existing) = collection
        .find_one(filter.clone())
        .await
        .map_err(|e| format!("Database error: {}", e))?
    {
        log::info!("✅ Found existing user by google_id: {}", existing.user_id);

        // Atualiza o perfil e o last_login a cada login
        let update = doc! {
            "$set": {
                "display_name": &profile.display_name,
                "first_name": &profile.first_name,
                "last_name": &profile.last_name,
                "image": profile.image.clone(),
                "last_login": BsonDateTime::now(),
                "updated_at": BsonDateTime::now(),
            }
        };

        collection
            .update_one(filter, update)
            .await
            .map_err(|e| format!("Failed to update user: {}", e))?;

        let mut user = existing;
        user.display_name = profile.display_name;
        user.first_name = profile.first_name;
        user.last_name = profile.last_name;
        user.image = profile.image;
        user.last_login = Some(BsonDateTime::now());

        return Ok(user);
    }

    // Generate user_id
    let new_user_id = ObjectId::new().to_hex();

    let new_user = User {
        id: None,
        user_id: new_user_id,
        google_id: profile.google_id,
        display_name: profile.display_name,
        first_name: profile.first_name,
        last_name: profile.last_name,
        image: profile.image,
        created_at: Some(BsonDateTime::now()),
        updated_at: Some(BsonDateTime::now()),
        last_login: Some(BsonDateTime::now()),
    };

    collection
        .insert_one(&new_user)
        .await
        .map_err(|e| format!("Failed to create user: {}", e))?;

    log::info!("✅ User registered successfully: {}", new_user.user_id);

    Ok(new_user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_parses_userinfo_payload() {
        let payload = json!({
            "id": "108989",
            "name": "Ada Lovelace",
            "given_name": "Ada",
            "family_name": "Lovelace",
            "picture": "https://lh3.googleusercontent.com/a/photo.jpg",
        });
        let profile = profile_from_userinfo(&payload).unwrap();
        assert_eq!(
            profile,
            GoogleProfile {
                google_id: "108989".to_string(),
                display_name: "Ada Lovelace".to_string(),
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                image: Some("https://lh3.googleusercontent.com/a/photo.jpg".to_string()),
            }
        );
    }

    #[test]
    fn profile_requires_subject_id() {
        let payload = json!({ "name": "No Id" });
        assert!(profile_from_userinfo(&payload).is_err());
    }

    #[test]
    fn profile_tolerates_missing_optional_fields() {
        let payload = json!({ "id": "42" });
        let profile = profile_from_userinfo(&payload).unwrap();
        assert_eq!(profile.google_id, "42");
        assert_eq!(profile.display_name, "");
        assert_eq!(profile.image, None);
    }
}
