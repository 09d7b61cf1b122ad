use actix_web::HttpResponse;
use handlebars::Handlebars;
use serde_json::json;

/// Renderiza um template como text/html
pub fn render_page(hb: &Handlebars, name: &str, data: &serde_json::Value) -> HttpResponse {
    match hb.render(name, data) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("❌ Template render failed ({}): {}", name, e);
            HttpResponse::InternalServerError().body("Internal Server Error")
        }
    }
}

/// Página de recurso não encontrado
pub fn render_404(hb: &Handlebars) -> HttpResponse {
    match hb.render("error/404", &json!({})) {
        Ok(body) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("❌ Template render failed (error/404): {}", e);
            HttpResponse::NotFound().body("Not Found")
        }
    }
}

/// Página de erro genérico de servidor
pub fn render_500(hb: &Handlebars) -> HttpResponse {
    match hb.render("error/500", &json!({})) {
        Ok(body) => HttpResponse::InternalServerError()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(e) => {
            log::error!("❌ Template render failed (error/500): {}", e);
            HttpResponse::InternalServerError().body("Internal Server Error")
        }
    }
}
