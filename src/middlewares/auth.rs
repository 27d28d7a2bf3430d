use crate::entities::Role;
use crate::error::{AppError, AppResult};
use crate::utils::JwtService;
use actix_web::dev::Payload;
use actix_web::http::Method;
use actix_web::{
    Error, FromRequest, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use uuid::Uuid;

/// Identity decoded from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

// Routes reachable without a token.
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // public for GET only
    read_only_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/health",
                "/api/health",
                "/swagger-ui",
                "/api-docs/openapi.json",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/", "/api/auth/"],
            read_only_paths: vec!["/api/items"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }

        if self
            .prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
        {
            return true;
        }

        *method == Method::GET
            && self.read_only_paths.iter().any(|&base| {
                path == base
                    || path
                        .strip_prefix(base)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        if self.public_paths.is_public(req.method(), req.path()) {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty());

        let Some(token) = token else {
            let error = AppError::AuthError("Missing access token".to_string());
            return Box::pin(async move { Err(error.into()) });
        };

        let user = self
            .jwt_service
            .verify_token(token)
            .and_then(|claims| {
                Ok(AuthUser {
                    id: claims.user_id()?,
                    email: claims.email,
                    role: claims.role,
                })
            });

        match user {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(_) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// Identity placed in the request by `AuthMiddleware`.
pub fn get_current_user(req: &HttpRequest) -> AppResult<AuthUser> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(get_current_user(req))
    }
}

/// An `AuthUser` whose role is `Admin`; any other role is rejected with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl AdminUser {
    pub fn from_user(user: AuthUser) -> AppResult<Self> {
        match user.role {
            Role::Admin => Ok(AdminUser(user)),
            Role::User => Err(AppError::Forbidden(
                "Access denied, administrators only".to_string(),
            )),
        }
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(get_current_user(req).and_then(AdminUser::from_user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let public = PublicPaths::new();

        assert!(public.is_public(&Method::GET, "/health"));
        assert!(public.is_public(&Method::POST, "/api/auth/login"));
        assert!(public.is_public(&Method::POST, "/api/auth/register"));
        assert!(public.is_public(&Method::GET, "/api/items"));
        assert!(public.is_public(&Method::GET, "/api/items/3f0e"));
        assert!(public.is_public(&Method::GET, "/swagger-ui/index.html"));

        assert!(!public.is_public(&Method::POST, "/api/items"));
        assert!(!public.is_public(&Method::DELETE, "/api/items/3f0e"));
        assert!(!public.is_public(&Method::GET, "/api/itemsx"));
        assert!(!public.is_public(&Method::GET, "/api/orders"));
        assert!(!public.is_public(&Method::GET, "/api/users/me"));
    }

    #[test]
    fn test_admin_gate() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: "ana@x.com".to_string(),
            role: Role::User,
        };
        assert!(matches!(
            AdminUser::from_user(user.clone()),
            Err(AppError::Forbidden(_))
        ));

        let admin = AuthUser {
            role: Role::Admin,
            ..user
        };
        assert!(AdminUser::from_user(admin).is_ok());
    }
}
