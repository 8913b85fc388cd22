mod common;

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use storefront_api::{
    dto::{
        catalog::NamedForm,
        orders::{OrderForm, PositionForm},
        products::ProductForm,
    },
    entity::{audit_logs, order_positions},
    error::AppError,
    middleware::auth::Permission,
    routes::params::PageQuery,
    services::{category_service, order_service, product_service, tag_service},
};

use common::{admin, create_user, database_state, user_with};

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("decimal literal")
}

fn position(product_id: i32, quantity: i64, discount: &str) -> PositionForm {
    PositionForm {
        product_id: Some(product_id),
        quantity: Some(quantity),
        discount: Some(dec(discount)),
        ..PositionForm::default()
    }
}

fn order_form(positions: Vec<PositionForm>) -> OrderForm {
    OrderForm {
        delivery_address: "1 Ferris Way".into(),
        customer_phone: "+100200300".into(),
        customer_name: "Ann".into(),
        positions,
    }
}

// Orders with their positions formset: create, edit, list and cascade delete.
#[tokio::test]
async fn order_positions_formset_flow() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let root = admin(admin_id);

    let category = category_service::create_category(
        &state,
        &root,
        NamedForm {
            name: "Kitchen".into(),
            description: "Mugs".into(),
        },
    )
    .await?
    .data
    .expect("category");
    let tag = tag_service::create_tag(
        &state,
        &root,
        NamedForm {
            name: "sale".into(),
            description: "Cheap".into(),
        },
    )
    .await?
    .data
    .expect("tag");
    let mut products = Vec::new();
    for name in ["Mug", "Kettle", "Spoon"] {
        let product = product_service::create_product(
            &state,
            &root,
            ProductForm {
                name: name.into(),
                description: format!("A {name}"),
                price: Some(dec("10.00")),
                categories: vec![category.id],
                tags: vec![tag.id],
            },
        )
        .await?
        .data
        .expect("product");
        products.push(product.id);
    }
    let (mug, kettle, spoon) = (products[0], products[1], products[2]);

    let clerk = user_with(&[Permission::AddOrder, Permission::ChangeOrder]);

    // An invalid position blocks the whole order.
    let rejected = order_service::create_order(
        &state,
        &clerk,
        order_form(vec![position(mug, 1, "0"), position(424242, -2, "0.001")]),
    )
    .await;
    match rejected {
        Err(AppError::Validation(errors)) => {
            assert!(errors.get("positions[1].quantity").is_some());
            assert!(errors.get("positions[1].discount").is_some());
        }
        other => panic!("expected validation error, got {:?}", other.map(|r| r.message)),
    }
    let rejected = order_service::create_order(
        &state,
        &clerk,
        order_form(vec![position(424242, 1, "0")]),
    )
    .await;
    assert!(matches!(rejected, Err(AppError::Validation(ref e)) if e.get("positions[0].product_id").is_some()));
    assert_eq!(order_positions::Entity::find().count(&state.orm).await?, 0);

    // Blank extra entries are skipped.
    let created = order_service::create_order(
        &state,
        &clerk,
        order_form(vec![
            position(mug, 2, "1.50"),
            position(kettle, 1, "0"),
            PositionForm::default(),
        ]),
    )
    .await?
    .data
    .expect("order");
    assert_eq!(created.positions.len(), 2);
    let order_number = created.order.order_number;
    let mug_position = created.positions[0].id;
    let kettle_position = created.positions[1].id;

    // Edit one position, delete another, add a third.
    let mut form = order_form(vec![
        PositionForm {
            id: Some(mug_position),
            ..position(mug, 5, "2.00")
        },
        PositionForm {
            id: Some(kettle_position),
            delete: true,
            ..PositionForm::default()
        },
        position(spoon, 3, "0"),
    ]);
    form.customer_name = "Ann Smith".into();
    let updated = order_service::update_order(&state, &clerk, order_number, form)
        .await?
        .data
        .expect("order");
    assert_eq!(updated.order.customer_name, "Ann Smith");
    let summary: Vec<(i32, i32)> = updated
        .positions
        .iter()
        .map(|p| (p.product_id, p.quantity))
        .collect();
    assert_eq!(summary, vec![(mug, 5), (spoon, 3)]);
    assert_eq!(updated.positions[0].discount, dec("2.00"));

    // A position id from another order is rejected.
    let other = order_service::create_order(&state, &clerk, order_form(vec![position(mug, 1, "0")]))
        .await?
        .data
        .expect("order");
    let foreign = order_form(vec![PositionForm {
        id: Some(other.positions[0].id),
        ..position(mug, 9, "0")
    }]);
    assert!(matches!(
        order_service::update_order(&state, &clerk, order_number, foreign).await,
        Err(AppError::Validation(ref e)) if e.get("positions[0].id").is_some()
    ));

    // A position removed earlier is no longer part of the order.
    let stale = order_form(vec![PositionForm {
        id: Some(kettle_position),
        ..position(kettle, 1, "0")
    }]);
    assert!(matches!(
        order_service::update_order(&state, &clerk, order_number, stale).await,
        Err(AppError::Validation(ref e)) if e.get("positions[0].id").is_some()
    ));

    // Concurrent edits of one order are serialized: the delete always wins and
    // the edit of the same position either ran first or sees it gone.
    let spoon_position = updated.positions[1].id;
    let removal = order_form(vec![PositionForm {
        id: Some(spoon_position),
        delete: true,
        ..PositionForm::default()
    }]);
    let edit = order_form(vec![PositionForm {
        id: Some(spoon_position),
        ..position(spoon, 7, "0")
    }]);
    let (removed, edited) = tokio::join!(
        order_service::update_order(&state, &clerk, order_number, removal),
        order_service::update_order(&state, &clerk, order_number, edit),
    );
    let removed = removed?.data.expect("order");
    assert!(removed.positions.iter().all(|p| p.id != spoon_position));
    match edited {
        Ok(_) => {}
        Err(AppError::Validation(errors)) => assert!(errors.get("positions[0].id").is_some()),
        Err(other) => panic!("concurrent edit failed: {other}"),
    }
    let current = order_service::get_order(&state, &clerk, order_number)
        .await?
        .data
        .expect("order");
    assert_eq!(
        current.positions.iter().map(|p| p.id).collect::<Vec<_>>(),
        vec![mug_position]
    );

    // Newest first, three per page.
    let listed = order_service::list_orders(&state, &clerk, PageQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(listed.items[0].order_number, other.order.order_number);

    // Deleting needs its own permission and cascades to positions.
    assert!(matches!(
        order_service::delete_order(&state, &clerk, order_number).await,
        Err(AppError::Forbidden)
    ));
    order_service::delete_order(&state, &root, order_number).await?;
    assert!(matches!(
        order_service::get_order(&state, &clerk, order_number).await,
        Err(AppError::NotFound)
    ));
    let remaining = order_positions::Entity::find()
        .filter(order_positions::Column::OrderId.eq(order_number))
        .count(&state.orm)
        .await?;
    assert_eq!(remaining, 0);

    // Deleting a product removes the positions that reference it.
    product_service::delete_product(&state, &root, mug).await?;
    let other_after = order_service::get_order(&state, &clerk, other.order.order_number)
        .await?
        .data
        .expect("order");
    assert!(other_after.positions.is_empty());

    let audited = audit_logs::Entity::find()
        .filter(audit_logs::Column::Action.eq("order_delete"))
        .count(&state.orm)
        .await?;
    assert_eq!(audited, 1);

    Ok(())
}
