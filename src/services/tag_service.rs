use sea_orm::{ActiveModelTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;

use crate::{
    audit,
    dto::catalog::{TagForm, TagList},
    entity::tags::{ActiveModel, Column, Entity as Tags, Model as TagModel},
    error::{AppError, AppResult},
    forms,
    middleware::auth::{AuthUser, Permission, ensure_permission},
    models::Tag,
    pagination::{self, TAGS_PER_PAGE},
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::query::{fetch_page, search_condition},
    state::AppState,
};

pub async fn list_tags(state: &AppState, query: SearchQuery) -> AppResult<ApiResponse<TagList>> {
    let per_page = pagination::page_size(query.per_page, TAGS_PER_PAGE);
    let finder = Tags::find()
        .filter(search_condition(query.search(), Column::Name, Column::Description))
        .order_by_asc(Column::Id);

    let (page, models) = fetch_page(&state.orm, finder, |total| {
        pagination::resolve_strict(query.page.as_deref(), per_page, total)
    })
    .await?;

    let items = models.into_iter().map(tag_from_entity).collect();
    Ok(ApiResponse::success("Tags", TagList { items }, Some(page.meta())))
}

pub async fn get_tag(state: &AppState, id: i32) -> AppResult<ApiResponse<Tag>> {
    let tag = Tags::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Tag", tag_from_entity(tag), None))
}

pub async fn create_tag(
    state: &AppState,
    user: &AuthUser,
    form: TagForm,
) -> AppResult<ApiResponse<Tag>> {
    ensure_permission(user, Permission::AddTag)?;
    forms::validate_named(&form).into_result()?;

    let tag = ActiveModel {
        id: NotSet,
        name: Set(form.name.trim().to_string()),
        description: Set(form.description.trim().to_string()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(tag_id = tag.id, "tag created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "tag_create",
        "tags",
        serde_json::json!({ "tag_id": tag.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Tag created",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

pub async fn update_tag(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    form: TagForm,
) -> AppResult<ApiResponse<Tag>> {
    ensure_permission(user, Permission::ChangeTag)?;
    let existing = Tags::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    forms::validate_named(&form).into_result()?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(form.name.trim().to_string());
    active.description = Set(form.description.trim().to_string());
    let tag = active.update(&state.orm).await?;

    tracing::info!(tag_id = tag.id, "tag updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "tag_update",
        "tags",
        serde_json::json!({ "tag_id": tag.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        tag_from_entity(tag),
        Some(Meta::empty()),
    ))
}

/// Products keep existing; only their link to the tag goes.
pub async fn delete_tag(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Permission::DeleteTag)?;
    let result = Tags::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(tag_id = id, "tag deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "tag_delete",
        "tags",
        serde_json::json!({ "tag_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn tag_from_entity(model: TagModel) -> Tag {
    Tag {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}
