use storybooks_service::{api, database, middleware, utils};

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use handlebars::{DirectorySourceOptions, Handlebars};
use std::env;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3002".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let session_secret = env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");

    log::info!("🚀 Starting StoryBooks Service...");
    log::info!("📊 Database: {}", database_url);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db);

    log::info!("✅ MongoDB connected successfully");

    // Handlebars: helpers + templates .hbs
    let mut hb = Handlebars::new();
    utils::hbs::register_helpers(&mut hb);
    hb.register_templates_directory("./templates", DirectorySourceOptions::default())
        .expect("Failed to register templates");
    let hb_data = web::Data::new(hb);

    log::info!("✅ Templates registered");

    // Chave de assinatura do cookie de sessão
    let session_key = Key::derive_from(session_secret.as_bytes());

    log::info!("🌐 Server starting on {}:{}", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(db_data.clone())
            .app_data(hb_data.clone())
            .wrap(Logger::default())
            .wrap(Logger::new("%a %{User-Agent}i"))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name("storybooks.sid".to_string())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(middleware::MethodOverride)
            // Static assets
            .service(Files::new("/public", "./public"))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Auth: fluxo OAuth do Google
            .service(
                web::scope("/auth")
                    .route("/google", web::get().to(api::auth::google_auth))
                    .route("/google/callback", web::get().to(api::auth::google_callback))
                    .route("/logout", web::get().to(api::auth::logout)),
            )
            // Página de login (somente visitantes)
            .service(
                web::resource("/")
                    .wrap(middleware::GuestGuard)
                    .route(web::get().to(api::index::login_page)),
            )
            // Dashboard (requer sessão)
            .service(
                web::scope("/dashboard")
                    .wrap(middleware::AuthGuard)
                    .route("", web::get().to(api::index::dashboard)),
            )
            // Stories (requer sessão)
            .service(
                web::scope("/stories")
                    .wrap(middleware::AuthGuard)
                    .route("", web::get().to(api::stories::index))
                    .route("", web::post().to(api::stories::create))
                    .route("/add", web::get().to(api::stories::add_form))
                    .route("/edit/{id}", web::get().to(api::stories::edit_form))
                    .route("/user/{user_id}", web::get().to(api::stories::user_stories))
                    // Deve ficar por último (catch-all)
                    .route("/{id}", web::get().to(api::stories::show))
                    .route("/{id}", web::put().to(api::stories::update))
                    .route("/{id}", web::delete().to(api::stories::delete)),
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
