use std::collections::{BTreeSet, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;

use crate::{
    audit,
    dto::orders::{OrderForm, OrderList, OrderWithPositions, PositionForm},
    entity::{
        order_positions::{
            ActiveModel as PositionActive, Column as PositionCol, Entity as OrderPositions,
            Model as PositionModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProductCol, Entity as Products},
    },
    error::{AppError, AppResult},
    forms::{self, FieldErrors},
    middleware::auth::{AuthUser, Permission, ensure_permission},
    models::{Order, OrderPosition},
    pagination::{self, ORDERS_PER_PAGE},
    response::{ApiResponse, Meta},
    routes::params::PageQuery,
    services::query::fetch_page,
    state::AppState,
};

#[derive(Debug, Clone, PartialEq)]
struct PositionValues {
    product_id: i32,
    quantity: i32,
    discount: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
enum PositionChange {
    Insert(PositionValues),
    Update(i32, PositionValues),
    Delete(i32),
}

/// Newest orders first.
pub async fn list_orders(
    state: &AppState,
    _user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let per_page = pagination::page_size(query.per_page, ORDERS_PER_PAGE);
    let finder = Orders::find().order_by_desc(OrderCol::OrderNumber);

    let (page, models) = fetch_page(&state.orm, finder, |total| {
        pagination::resolve_strict(query.page.as_deref(), per_page, total)
    })
    .await?;

    let items = models.into_iter().map(order_from_entity).collect();
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(page.meta()),
    ))
}

pub async fn get_order(
    state: &AppState,
    _user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderWithPositions>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let positions = positions_of(&state.orm, order.order_number).await?;

    Ok(ApiResponse::success(
        "Order",
        OrderWithPositions {
            order: order_from_entity(order),
            positions,
        },
        None,
    ))
}

/// Save an order with its positions. Nothing is written unless the order
/// form and every position are valid.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    form: OrderForm,
) -> AppResult<ApiResponse<OrderWithPositions>> {
    ensure_permission(user, Permission::AddOrder)?;

    let mut errors = forms::validate_order(&form);
    let changes =
        plan_position_changes(&state.orm, &form.positions, &HashSet::new(), &mut errors).await?;
    errors.into_result()?;

    let txn = state.orm.begin().await?;
    let order = OrderActive {
        order_number: NotSet,
        order_date: NotSet,
        delivery_address: Set(form.delivery_address.trim().to_string()),
        customer_phone: Set(form.customer_phone.trim().to_string()),
        customer_name: Set(form.customer_name.trim().to_string()),
    }
    .insert(&txn)
    .await?;
    apply_position_changes(&txn, order.order_number, changes).await?;
    let positions = positions_of(&txn, order.order_number).await?;
    txn.commit().await?;

    tracing::info!(
        order_number = order.order_number,
        positions = positions.len(),
        "order created"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_number": order.order_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderWithPositions {
            order: order_from_entity(order),
            positions,
        },
        Some(Meta::empty()),
    ))
}

/// Replace the order fields and apply the submitted positions: entries with
/// an id update (or delete) that position, entries without one are added.
/// Positions that are not submitted stay as they are.
pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    form: OrderForm,
) -> AppResult<ApiResponse<OrderWithPositions>> {
    ensure_permission(user, Permission::ChangeOrder)?;

    // Locking the order row serializes concurrent edits of the same order, so
    // the owned positions cannot change before this transaction commits.
    let txn = state.orm.begin().await?;
    let existing = Orders::find_by_id(id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let owned: HashSet<i32> = OrderPositions::find()
        .select_only()
        .column(PositionCol::Id)
        .filter(PositionCol::OrderId.eq(existing.order_number))
        .lock_exclusive()
        .into_tuple::<i32>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();

    let mut errors = forms::validate_order(&form);
    let changes = plan_position_changes(&txn, &form.positions, &owned, &mut errors).await?;
    errors.into_result()?;

    let mut active: OrderActive = existing.into();
    active.delivery_address = Set(form.delivery_address.trim().to_string());
    active.customer_phone = Set(form.customer_phone.trim().to_string());
    active.customer_name = Set(form.customer_name.trim().to_string());
    let order = active.update(&txn).await?;
    apply_position_changes(&txn, order.order_number, changes).await?;
    let positions = positions_of(&txn, order.order_number).await?;
    txn.commit().await?;

    tracing::info!(order_number = order.order_number, "order updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_number": order.order_number }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        OrderWithPositions {
            order: order_from_entity(order),
            positions,
        },
        Some(Meta::empty()),
    ))
}

/// Positions go with the order.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_permission(user, Permission::DeleteOrder)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(order_number = id, "order deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_number": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Validate the positions formset against the ids the order already owns and
/// turn it into a list of changes. Errors land in `errors` under
/// `positions[i].<field>`.
async fn plan_position_changes<C: ConnectionTrait>(
    conn: &C,
    positions: &[PositionForm],
    owned: &HashSet<i32>,
    errors: &mut FieldErrors,
) -> AppResult<Vec<PositionChange>> {
    let mut changes = Vec::new();
    let mut product_refs: Vec<(usize, i32)> = Vec::new();

    for (index, position) in positions.iter().enumerate() {
        if position.is_blank() {
            continue;
        }
        let prefix = forms::position_prefix(index);

        if let Some(position_id) = position.id {
            if !owned.contains(&position_id) {
                errors.add(format!("{prefix}.id"), forms::invalid_choice(position_id));
                continue;
            }
            if position.delete {
                changes.push(PositionChange::Delete(position_id));
                continue;
            }
        } else if position.delete {
            continue;
        }

        let position_errors = forms::validate_position(position);
        if !position_errors.is_empty() {
            errors.extend_prefixed(&prefix, position_errors);
            continue;
        }
        let Some(values) = position_values(position) else {
            continue;
        };
        product_refs.push((index, values.product_id));
        changes.push(match position.id {
            Some(position_id) => PositionChange::Update(position_id, values),
            None => PositionChange::Insert(values),
        });
    }

    let product_ids: BTreeSet<i32> = product_refs.iter().map(|(_, id)| *id).collect();
    if !product_ids.is_empty() {
        let found: HashSet<i32> = Products::find()
            .select_only()
            .column(ProductCol::Id)
            .filter(ProductCol::Id.is_in(product_ids))
            .into_tuple::<i32>()
            .all(conn)
            .await?
            .into_iter()
            .collect();
        for (index, product_id) in product_refs {
            if !found.contains(&product_id) {
                errors.add(
                    format!("{}.product_id", forms::position_prefix(index)),
                    forms::invalid_choice(product_id),
                );
            }
        }
    }

    Ok(changes)
}

fn position_values(position: &PositionForm) -> Option<PositionValues> {
    Some(PositionValues {
        product_id: position.product_id?,
        quantity: i32::try_from(position.quantity?).ok()?,
        discount: position.discount?,
    })
}

async fn apply_position_changes<C: ConnectionTrait>(
    conn: &C,
    order_number: i32,
    changes: Vec<PositionChange>,
) -> AppResult<()> {
    for change in changes {
        match change {
            PositionChange::Insert(values) => {
                PositionActive {
                    id: NotSet,
                    order_id: Set(order_number),
                    product_id: Set(values.product_id),
                    quantity: Set(values.quantity),
                    discount: Set(values.discount),
                }
                .insert(conn)
                .await?;
            }
            PositionChange::Update(id, values) => {
                PositionActive {
                    id: Set(id),
                    order_id: Set(order_number),
                    product_id: Set(values.product_id),
                    quantity: Set(values.quantity),
                    discount: Set(values.discount),
                }
                .update(conn)
                .await?;
            }
            PositionChange::Delete(id) => {
                OrderPositions::delete_many()
                    .filter(PositionCol::Id.eq(id))
                    .filter(PositionCol::OrderId.eq(order_number))
                    .exec(conn)
                    .await?;
            }
        }
    }
    Ok(())
}

async fn positions_of<C: ConnectionTrait>(
    conn: &C,
    order_number: i32,
) -> AppResult<Vec<OrderPosition>> {
    Ok(OrderPositions::find()
        .filter(PositionCol::OrderId.eq(order_number))
        .order_by_asc(PositionCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .map(position_from_entity)
        .collect())
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        order_number: model.order_number,
        order_date: model.order_date.with_timezone(&Utc),
        delivery_address: model.delivery_address,
        customer_phone: model.customer_phone,
        customer_name: model.customer_name,
    }
}

fn position_from_entity(model: PositionModel) -> OrderPosition {
    OrderPosition {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        discount: model.discount,
    }
}
