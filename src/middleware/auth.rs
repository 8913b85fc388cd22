use std::fmt;

use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError, state::AppState};

pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

/// Gated operations, named `store.<action>_<entity>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    AddProduct,
    ChangeProduct,
    DeleteProduct,
    AddCategory,
    ChangeCategory,
    DeleteCategory,
    AddTag,
    ChangeTag,
    DeleteTag,
    AddOrder,
    ChangeOrder,
    DeleteOrder,
}

impl Permission {
    pub const ALL: [Permission; 12] = [
        Permission::AddProduct,
        Permission::ChangeProduct,
        Permission::DeleteProduct,
        Permission::AddCategory,
        Permission::ChangeCategory,
        Permission::DeleteCategory,
        Permission::AddTag,
        Permission::ChangeTag,
        Permission::DeleteTag,
        Permission::AddOrder,
        Permission::ChangeOrder,
        Permission::DeleteOrder,
    ];

    pub fn codename(&self) -> &'static str {
        match self {
            Permission::AddProduct => "store.add_product",
            Permission::ChangeProduct => "store.change_product",
            Permission::DeleteProduct => "store.delete_product",
            Permission::AddCategory => "store.add_category",
            Permission::ChangeCategory => "store.change_category",
            Permission::DeleteCategory => "store.delete_category",
            Permission::AddTag => "store.add_tag",
            Permission::ChangeTag => "store.change_tag",
            Permission::DeleteTag => "store.delete_tag",
            Permission::AddOrder => "store.add_order",
            Permission::ChangeOrder => "store.change_order",
            Permission::DeleteOrder => "store.delete_order",
        }
    }

    pub fn from_codename(codename: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.codename() == codename)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codename())
    }
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_admin()
            || self
                .permissions
                .iter()
                .any(|p| p == permission.codename())
    }
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ADMIN_ROLE)
}

pub fn ensure_permission(user: &AuthUser, permission: Permission) -> Result<(), AppError> {
    if !user.has_permission(permission) {
        tracing::debug!(user_id = %user.user_id, permission = %permission, "permission denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn decode_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    let user_id = Uuid::parse_str(&decoded.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
        permissions: decoded.claims.perms,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized)?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized)?;

        let token = auth_str
            .strip_prefix("Bearer ")
            .map(str::trim)
            .ok_or(AppError::Unauthorized)?;

        decode_token(token, &state.auth.jwt_secret)
    }
}
