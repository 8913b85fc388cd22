use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;

use crate::{
    audit,
    dto::catalog::{CategoryDetail, CategoryForm, CategoryList},
    entity::{
        categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    forms,
    middleware::auth::{AuthUser, Permission, ensure_permission},
    models::Category,
    pagination::{self, CATEGORIES_PER_PAGE},
    response::{ApiResponse, Meta},
    routes::params::SearchQuery,
    services::{
        product_service::load_products,
        query::{fetch_page, search_condition},
    },
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let per_page = pagination::page_size(query.per_page, CATEGORIES_PER_PAGE);
    let finder = Categories::find()
        .filter(search_condition(query.search(), Column::Name, Column::Description))
        .order_by_asc(Column::Id);

    let (page, models) = fetch_page(&state.orm, finder, |total| {
        pagination::resolve_strict(query.page.as_deref(), per_page, total)
    })
    .await?;

    let items = models.into_iter().map(category_from_entity).collect();
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(page.meta()),
    ))
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let related = category
        .find_related(Products)
        .order_by_asc(ProductCol::Id)
        .all(&state.orm)
        .await?;
    let related_products = load_products(&state.orm, related).await?;

    Ok(ApiResponse::success(
        "Category",
        CategoryDetail {
            category: category_from_entity(category),
            related_products,
        },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    form: CategoryForm,
) -> AppResult<ApiResponse<Category>> {
    ensure_permission(user, Permission::AddCategory)?;
    forms::validate_named(&form).into_result()?;

    let category = ActiveModel {
        id: NotSet,
        name: Set(form.name.trim().to_string()),
        description: Set(form.description.trim().to_string()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = category.id, "category created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    form: CategoryForm,
) -> AppResult<ApiResponse<Category>> {
    ensure_permission(user, Permission::ChangeCategory)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    forms::validate_named(&form).into_result()?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(form.name.trim().to_string());
    active.description = Set(form.description.trim().to_string());
    let category = active.update(&state.orm).await?;

    tracing::info!(category_id = category.id, "category updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

/// Products keep existing; only their link to the category goes.
pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Permission::DeleteCategory)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(category_id = id, "category deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub(crate) fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}
