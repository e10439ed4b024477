//! Redirects unauthenticated browser requests to the identity provider.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::{StatusCode, header};
use actix_web::{Error, HttpResponse};

/// Turns `401 Unauthorized` responses into a `303 See Other` to `sign_in_url`.
#[derive(Clone)]
pub struct RedirectUnauthorized {
    sign_in_url: Rc<str>,
}

impl RedirectUnauthorized {
    pub fn new(sign_in_url: impl AsRef<str>) -> Self {
        Self {
            sign_in_url: Rc::from(sign_in_url.as_ref()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RedirectUnauthorized
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = RedirectUnauthorizedMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RedirectUnauthorizedMiddleware {
            service: Rc::new(service),
            sign_in_url: self.sign_in_url.clone(),
        }))
    }
}

pub struct RedirectUnauthorizedMiddleware<S> {
    service: Rc<S>,
    sign_in_url: Rc<str>,
}

impl<S, B> Service<ServiceRequest> for RedirectUnauthorizedMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let sign_in_url = Rc::clone(&self.sign_in_url);

        Box::pin(async move {
            // Extractor failures are already rendered into responses here.
            let (request, response) = service.call(req).await?.into_parts();

            if response.status() == StatusCode::UNAUTHORIZED {
                let redirect = HttpResponse::SeeOther()
                    .insert_header((header::LOCATION, sign_in_url.as_ref()))
                    .finish();
                return Ok(ServiceResponse::new(request, redirect));
            }

            Ok(ServiceResponse::new(request, response.map_into_boxed_body()))
        })
    }
}
