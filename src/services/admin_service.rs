use std::collections::BTreeSet;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    audit,
    dto::auth::{SetPermissionsRequest, UserPermissions},
    entity::{
        user_permissions::{ActiveModel as PermissionActive, Column as PermissionCol, Entity as Permissions},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    forms::FieldErrors,
    middleware::auth::{AuthUser, Permission, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Replace the permission set of a user. Takes effect at the user's next login.
pub async fn set_user_permissions(
    state: &AppState,
    admin: &AuthUser,
    user_id: Uuid,
    payload: SetPermissionsRequest,
) -> AppResult<ApiResponse<UserPermissions>> {
    ensure_admin(admin)?;

    let mut errors = FieldErrors::new();
    let mut codenames = BTreeSet::new();
    for codename in payload.permissions {
        match Permission::from_codename(&codename) {
            Some(permission) => {
                codenames.insert(permission.codename().to_string());
            }
            None => errors.add("permissions", format!("Unknown permission {codename}.")),
        }
    }
    errors.into_result()?;

    if Users::find_by_id(user_id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let txn = state.orm.begin().await?;
    Permissions::delete_many()
        .filter(PermissionCol::UserId.eq(user_id))
        .exec(&txn)
        .await?;
    if !codenames.is_empty() {
        Permissions::insert_many(codenames.iter().map(|codename| PermissionActive {
            user_id: Set(user_id),
            codename: Set(codename.clone()),
        }))
        .exec_without_returning(&txn)
        .await?;
    }
    txn.commit().await?;

    tracing::info!(user_id = %user_id, count = codenames.len(), "permissions replaced");
    audit::record(
        &state.orm,
        Some(admin.user_id),
        "permissions_set",
        "user_permissions",
        serde_json::json!({ "user_id": user_id, "permissions": codenames }),
    )
    .await;

    Ok(ApiResponse::success(
        "Permissions updated",
        UserPermissions {
            user_id,
            permissions: codenames.into_iter().collect(),
        },
        Some(Meta::empty()),
    ))
}
