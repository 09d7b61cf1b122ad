use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    http::{header, StatusCode},
    test, web, App, HttpResponse,
};
use handlebars::{DirectorySourceOptions, Handlebars};

use storybooks_service::{
    api,
    middleware::{auth::SESSION_USER_KEY, AuthGuard, GuestGuard, MethodOverride},
    models::SessionUser,
    utils,
};

/// Rota auxiliar que abre uma sessão sem passar pelo Google
async fn test_login(session: Session) -> HttpResponse {
    let user = SessionUser {
        user_id: "user-1".to_string(),
        display_name: "Ada Lovelace".to_string(),
        first_name: "Ada".to_string(),
        image: None,
    };
    session.insert(SESSION_USER_KEY, user).unwrap();
    HttpResponse::Ok().finish()
}

/// Réplica da tabela de rotas do main.rs, sem MongoDB
fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let mut hb = Handlebars::new();
    utils::hbs::register_helpers(&mut hb);
    hb.register_templates_directory("./templates", DirectorySourceOptions::default())
        .expect("templates");

    let session_key = Key::from(&[0u8; 64]);

    App::new()
        .app_data(web::Data::new(hb))
        .wrap(
            SessionMiddleware::builder(CookieSessionStore::default(), session_key)
                .cookie_secure(false)
                .build(),
        )
        .wrap(MethodOverride)
        .route("/test/login", web::get().to(test_login))
        .service(
            web::resource("/")
                .wrap(GuestGuard)
                .route(web::get().to(api::index::login_page)),
        )
        .service(
            web::scope("/dashboard")
                .wrap(AuthGuard)
                .route("", web::get().to(api::index::dashboard)),
        )
        .service(
            web::scope("/stories")
                .wrap(AuthGuard)
                .route("", web::get().to(api::stories::index))
                .route("", web::post().to(api::stories::create))
                .route("/add", web::get().to(api::stories::add_form))
                .route("/edit/{id}", web::get().to(api::stories::edit_form))
                .route("/user/{user_id}", web::get().to(api::stories::user_stories))
                .route("/{id}", web::get().to(api::stories::show))
                .route("/{id}", web::put().to(api::stories::update))
                .route("/{id}", web::delete().to(api::stories::delete)),
        )
}

#[actix_web::test]
async fn unauthenticated_requests_are_redirected_to_login() {
    let app = test::init_service(test_app()).await;

    let protected = [
        "/dashboard",
        "/stories",
        "/stories/add",
        "/stories/edit/5f1d7f9a0c0c0c0c0c0c0c0c",
        "/stories/user/user-1",
        "/stories/5f1d7f9a0c0c0c0c0c0c0c0c",
    ];

    for uri in protected {
        let req = test::TestRequest::get().uri(uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(
            res.headers().get(header::LOCATION).unwrap(),
            "/",
            "{}",
            uri
        );
    }
}

#[actix_web::test]
async fn tunneled_mutations_are_still_guarded() {
    let app = test::init_service(test_app()).await;

    for query in ["_method=PUT", "_method=DELETE"] {
        let uri = format!("/stories/5f1d7f9a0c0c0c0c0c0c0c0c?{}", query);
        let req = test::TestRequest::post().uri(&uri).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::FOUND, "{}", uri);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");
    }
}

#[actix_web::test]
async fn guest_sees_login_page() {
    let app = test::init_service(test_app()).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Log In With Google"));
}

#[actix_web::test]
async fn logged_in_guest_is_redirected_to_dashboard() {
    let app = test::init_service(test_app()).await;

    let login = test::call_service(
        &app,
        test::TestRequest::get().uri("/test/login").to_request(),
    )
    .await;
    assert!(login.status().is_success());
    let cookie = login
        .response()
        .cookies()
        .next()
        .expect("session cookie")
        .into_owned();

    let req = test::TestRequest::get().uri("/").cookie(cookie).to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
}

#[actix_web::test]
async fn authenticated_user_reaches_add_form() {
    let app = test::init_service(test_app()).await;

    let login = test::call_service(
        &app,
        test::TestRequest::get().uri("/test/login").to_request(),
    )
    .await;
    let cookie = login
        .response()
        .cookies()
        .next()
        .expect("session cookie")
        .into_owned();

    let req = test::TestRequest::get()
        .uri("/stories/add")
        .cookie(cookie)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = test::read_body(res).await;
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Add Story"));
}
