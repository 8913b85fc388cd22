use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    audit,
    dto::products::{ProductDetail, ProductForm, ProductList, ProductsByCategory, ProductsByTag},
    entity::{
        categories::{Column as CategoryCol, Entity as Categories},
        product_categories::{
            ActiveModel as ProductCategoryActive, Column as ProductCategoryCol,
            Entity as ProductCategories,
        },
        product_tags::{ActiveModel as ProductTagActive, Column as ProductTagCol, Entity as ProductTags},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        tags::{Column as TagCol, Entity as Tags},
    },
    error::{AppError, AppResult},
    forms::{self, FieldErrors},
    middleware::auth::{AuthUser, Permission, ensure_permission},
    models::Product,
    pagination::{self, CATALOG_PER_PAGE, PRODUCTS_PER_PAGE},
    response::{ApiResponse, Meta},
    routes::params::{PageQuery, SearchQuery},
    services::{
        category_service::category_from_entity,
        query::{fetch_page, search_condition},
        tag_service::tag_from_entity,
    },
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: SearchQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let per_page = pagination::page_size(query.per_page, PRODUCTS_PER_PAGE);
    let finder = Products::find()
        .filter(search_condition(query.search(), Column::Name, Column::Description))
        .order_by_asc(Column::Id);

    let (page, models) = fetch_page(&state.orm, finder, |total| {
        pagination::resolve_strict(query.page.as_deref(), per_page, total)
    })
    .await?;

    let items = load_products(&state.orm, models).await?;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(page.meta()),
    ))
}

/// Every product, unpaginated.
pub async fn index(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let models = Products::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;
    let items = load_products(&state.orm, models).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(1, total.max(1), total)),
    ))
}

/// One product per page; out of range pages fall back instead of failing.
pub async fn catalog(state: &AppState, query: PageQuery) -> AppResult<ApiResponse<ProductList>> {
    let finder = Products::find().order_by_asc(Column::Id);
    let (page, models) = fetch_page(&state.orm, finder, |total| {
        Ok(pagination::resolve_lenient(
            query.page.as_deref(),
            CATALOG_PER_PAGE,
            total,
        ))
    })
    .await?;

    let items = load_products(&state.orm, models).await?;
    Ok(ApiResponse::success(
        "Catalog",
        ProductList { items },
        Some(page.meta()),
    ))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<ProductDetail>> {
    let model = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let product = load_products(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;

    let related_products = if product.categories.is_empty() {
        Vec::new()
    } else {
        let related = Products::find()
            .inner_join(ProductCategories)
            .filter(ProductCategoryCol::CategoryId.is_in(product.categories.clone()))
            .filter(Column::Id.ne(product.id))
            .distinct()
            .order_by_asc(Column::Id)
            .all(&state.orm)
            .await?;
        load_products(&state.orm, related).await?
    };
    let category_id = product.categories.first().copied();

    Ok(ApiResponse::success(
        "Product",
        ProductDetail {
            product,
            related_products,
            category_id,
        },
        None,
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_permission(user, Permission::AddProduct)?;
    validate_form(&state.orm, &form).await?;

    let txn = state.orm.begin().await?;
    let model = ActiveModel {
        id: NotSet,
        name: Set(form.name.trim().to_string()),
        description: Set(form.description.trim().to_string()),
        price: Set(form.price.unwrap_or_default()),
    }
    .insert(&txn)
    .await?;
    replace_links(&txn, model.id, &form.categories, &form.tags).await?;
    txn.commit().await?;

    tracing::info!(product_id = model.id, "product created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": model.id }),
    )
    .await;

    let product = load_products(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    form: ProductForm,
) -> AppResult<ApiResponse<Product>> {
    ensure_permission(user, Permission::ChangeProduct)?;
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    validate_form(&state.orm, &form).await?;

    let txn = state.orm.begin().await?;
    let mut active: ActiveModel = existing.into();
    active.name = Set(form.name.trim().to_string());
    active.description = Set(form.description.trim().to_string());
    active.price = Set(form.price.unwrap_or_default());
    let model = active.update(&txn).await?;
    replace_links(&txn, model.id, &form.categories, &form.tags).await?;
    txn.commit().await?;

    tracing::info!(product_id = model.id, "product updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": model.id }),
    )
    .await;

    let product = load_products(&state.orm, vec![model])
        .await?
        .pop()
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Permission::DeleteProduct)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = id, "product deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn products_by_category(
    state: &AppState,
    category_id: i32,
) -> AppResult<ApiResponse<ProductsByCategory>> {
    let category = Categories::find_by_id(category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let models = category
        .find_related(Products)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;
    let products = load_products(&state.orm, models).await?;

    Ok(ApiResponse::success(
        "Products by category",
        ProductsByCategory {
            category: category_from_entity(category),
            products,
        },
        None,
    ))
}

/// Tag names are not unique; the oldest tag with the name wins.
pub async fn products_by_tag(
    state: &AppState,
    tag_name: &str,
) -> AppResult<ApiResponse<ProductsByTag>> {
    let tag = Tags::find()
        .filter(TagCol::Name.eq(tag_name))
        .order_by_asc(TagCol::Id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let models = tag
        .find_related(Products)
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;
    let products = load_products(&state.orm, models).await?;

    Ok(ApiResponse::success(
        "Products by tag",
        ProductsByTag {
            tag: tag_from_entity(tag),
            products,
        },
        None,
    ))
}

/// Attach category and tag ids to each product, keeping the input order.
pub(crate) async fn load_products<C: ConnectionTrait>(
    conn: &C,
    models: Vec<ProductModel>,
) -> AppResult<Vec<Product>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

    let mut categories: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in ProductCategories::find()
        .filter(ProductCategoryCol::ProductId.is_in(ids.clone()))
        .order_by_asc(ProductCategoryCol::CategoryId)
        .all(conn)
        .await?
    {
        categories
            .entry(link.product_id)
            .or_default()
            .push(link.category_id);
    }

    let mut tags: HashMap<i32, Vec<i32>> = HashMap::new();
    for link in ProductTags::find()
        .filter(ProductTagCol::ProductId.is_in(ids))
        .order_by_asc(ProductTagCol::TagId)
        .all(conn)
        .await?
    {
        tags.entry(link.product_id).or_default().push(link.tag_id);
    }

    Ok(models
        .into_iter()
        .map(|model| Product {
            categories: categories.remove(&model.id).unwrap_or_default(),
            tags: tags.remove(&model.id).unwrap_or_default(),
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
        })
        .collect())
}

async fn validate_form<C: ConnectionTrait>(conn: &C, form: &ProductForm) -> AppResult<()> {
    let mut errors = forms::validate_product(form);

    let category_ids: BTreeSet<i32> = form.categories.iter().copied().collect();
    if !category_ids.is_empty() {
        let found: BTreeSet<i32> = Categories::find()
            .select_only()
            .column(CategoryCol::Id)
            .filter(CategoryCol::Id.is_in(category_ids.iter().copied()))
            .into_tuple::<i32>()
            .all(conn)
            .await?
            .into_iter()
            .collect();
        report_missing(&mut errors, "categories", &category_ids, &found);
    }

    let tag_ids: BTreeSet<i32> = form.tags.iter().copied().collect();
    if !tag_ids.is_empty() {
        let found: BTreeSet<i32> = Tags::find()
            .select_only()
            .column(TagCol::Id)
            .filter(TagCol::Id.is_in(tag_ids.iter().copied()))
            .into_tuple::<i32>()
            .all(conn)
            .await?
            .into_iter()
            .collect();
        report_missing(&mut errors, "tags", &tag_ids, &found);
    }

    errors.into_result()
}

fn report_missing(
    errors: &mut FieldErrors,
    field: &str,
    requested: &BTreeSet<i32>,
    found: &BTreeSet<i32>,
) {
    for id in requested.difference(found) {
        errors.add(field, forms::invalid_choice(id));
    }
}

async fn replace_links<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    category_ids: &[i32],
    tag_ids: &[i32],
) -> AppResult<()> {
    ProductCategories::delete_many()
        .filter(ProductCategoryCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;
    ProductTags::delete_many()
        .filter(ProductTagCol::ProductId.eq(product_id))
        .exec(conn)
        .await?;

    let category_ids: BTreeSet<i32> = category_ids.iter().copied().collect();
    if !category_ids.is_empty() {
        ProductCategories::insert_many(category_ids.into_iter().map(|category_id| {
            ProductCategoryActive {
                product_id: Set(product_id),
                category_id: Set(category_id),
            }
        }))
        .exec_without_returning(conn)
        .await?;
    }

    let tag_ids: BTreeSet<i32> = tag_ids.iter().copied().collect();
    if !tag_ids.is_empty() {
        ProductTags::insert_many(tag_ids.into_iter().map(|tag_id| ProductTagActive {
            product_id: Set(product_id),
            tag_id: Set(tag_id),
        }))
        .exec_without_returning(conn)
        .await?;
    }

    Ok(())
}
