use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool otimizado
        client_options.max_pool_size = Some(20); // Max 20 conexões simultâneas
        client_options.min_pool_size = Some(5); // Mantém 5 conexões sempre vivas
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300)); // 5min idle

        // Timeouts otimizados
        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        let db = client.database(db_name_from_uri(uri));

        // Test connection
        db.list_collection_names().await?;

        let mongodb = Self { client, db };

        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        // Index for stories: (user_id) - dashboard e checagem de dono
        let stories = self
            .database()
            .collection::<mongodb::bson::Document>("stories");

        let stories_user_index = IndexModel::builder().keys(doc! { "user_id": 1 }).build();

        match stories.create_index(stories_user_index).await {
            Ok(_) => log::info!("   ✅ Index created: stories(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // Index: stories(status, created_at) - feed público ordenado por recência
        let stories_feed_index = IndexModel::builder()
            .keys(doc! { "status": 1, "created_at": -1 })
            .build();

        match stories.create_index(stories_feed_index).await {
            Ok(_) => log::info!("   ✅ Index created: stories(status, created_at)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        // Unique index: users(google_id) - um usuário por subject do Google
        let users = self
            .database()
            .collection::<mongodb::bson::Document>("users");

        let users_google_index = IndexModel::builder()
            .keys(doc! { "google_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match users.create_index(users_google_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(google_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Extract database name from URI or use default
fn db_name_from_uri(uri: &str) -> &str {
    uri.split('/')
        .next_back()
        .and_then(|s| s.split('?').next())
        .filter(|s| !s.is_empty())
        .unwrap_or("storybooks")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_name_falls_back_to_default() {
        assert_eq!(
            db_name_from_uri("mongodb://localhost:27017/storybooks_dev"),
            "storybooks_dev"
        );
        assert_eq!(
            db_name_from_uri("mongodb://localhost:27017/app?retryWrites=true"),
            "app"
        );
        assert_eq!(db_name_from_uri("mongodb://localhost:27017/"), "storybooks");
    }
}
