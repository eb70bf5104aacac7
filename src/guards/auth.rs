use log::{debug, warn};
use rocket::http::Status;
use rocket::request::{self, FromRequest, Outcome, Request};

// === OpenAPI (compatible with rocket_okapi 0.8.0 / 0.8.1) ===
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};

use crate::services::jwt::SUPER_ADMIN_ROLE;
use crate::services::JwtService;

/// Secret used to verify bearer tokens, managed at ignite.
pub struct JwtSecret(pub String);

/// Any authenticated staff member.
pub struct AdminGuard {
    pub admin_id: String,
    pub email: String,
    pub role: String,
}

impl AdminGuard {
    pub fn is_super_admin(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(token) = req.headers().get_one("Authorization") else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let token = token.trim_start_matches("Bearer ");

        let verified = match req.rocket().state::<JwtSecret>() {
            Some(secret) => JwtService::verify_with_secret(token, &secret.0),
            None => JwtService::verify_token(token),
        };

        match verified {
            Ok(claims) => Outcome::Success(AdminGuard {
                admin_id: claims.sub,
                email: claims.email,
                role: claims.role,
            }),
            Err(e) => {
                debug!("Rejected bearer token: {}", e);
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

/// Staff with the super admin role. Others get 403.
pub struct SuperAdminGuard {
    pub admin: AdminGuard,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SuperAdminGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match req.guard::<AdminGuard>().await {
            Outcome::Success(admin) if admin.is_super_admin() => {
                Outcome::Success(SuperAdminGuard { admin })
            }
            Outcome::Success(admin) => {
                warn!("Admin {} is not allowed to manage discounts", admin.admin_id);
                Outcome::Error((Status::Forbidden, ()))
            }
            Outcome::Error(e) => Outcome::Error(e),
            Outcome::Forward(f) => Outcome::Forward(f),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AdminGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}

impl<'a> OpenApiFromRequest<'a> for SuperAdminGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
