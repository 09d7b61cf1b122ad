use actix_session::SessionExt;
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, HttpResponse,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::models::SessionUser;

/// Chave do usuário autenticado dentro do cookie de sessão
pub const SESSION_USER_KEY: &str = "user";

/// Exige sessão autenticada; visitantes são redirecionados para a página de login.
/// O `SessionUser` é inserido nas extensions para os handlers extraírem via
/// `web::ReqData<SessionUser>`.
pub struct AuthGuard;

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardService { service }))
    }
}

pub struct AuthGuardService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = req.get_session();

        match session.get::<SessionUser>(SESSION_USER_KEY) {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Ok(None) => redirect_to(req, "/"),
            Err(e) => {
                log::warn!("⚠️  Invalid session cookie: {}", e);
                redirect_to(req, "/")
            }
        }
    }
}

/// Somente visitantes; usuários logados vão direto para o dashboard.
pub struct GuestGuard;

impl<S, B> Transform<S, ServiceRequest> for GuestGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GuestGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GuestGuardService { service }))
    }
}

pub struct GuestGuardService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for GuestGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let session = req.get_session();

        match session.get::<SessionUser>(SESSION_USER_KEY) {
            Ok(Some(_)) => redirect_to(req, "/dashboard"),
            _ => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
        }
    }
}

fn redirect_to<B: 'static>(
    req: ServiceRequest,
    location: &'static str,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
    let (request, _pl) = req.into_parts();
    let response = HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
        .map_into_right_body();

    Box::pin(async move { Ok(ServiceResponse::new(request, response)) })
}
