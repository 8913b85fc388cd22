mod common;

use std::str::FromStr;

use rust_decimal::Decimal;
use storefront_api::{
    dto::{catalog::NamedForm, products::ProductForm},
    error::AppError,
    routes::params::{PageQuery, SearchQuery},
    services::{category_service, product_service, tag_service},
};

use common::{admin, create_user, database_state};

fn named(name: &str, description: &str) -> NamedForm {
    NamedForm {
        name: name.into(),
        description: description.into(),
    }
}

fn search(q: Option<&str>, page: Option<&str>) -> SearchQuery {
    SearchQuery {
        q: q.map(str::to_string),
        page: page.map(str::to_string),
        per_page: None,
    }
}

// Categories, tags and products: search, paging, related products and cascades.
#[tokio::test]
async fn catalog_browsing_flow() -> anyhow::Result<()> {
    let Some(state) = database_state().await? else {
        return Ok(());
    };
    let admin_id = create_user(&state, "admin", "admin@example.com").await?;
    let staff = admin(admin_id);

    let apparel = category_service::create_category(&state, &staff, named("Apparel", "Clothes"))
        .await?
        .data
        .expect("category");
    let kitchen = category_service::create_category(&state, &staff, named("Kitchen", "Mugs and pans"))
        .await?
        .data
        .expect("category");
    let books = category_service::create_category(&state, &staff, named("Books", "Paper"))
        .await?
        .data
        .expect("category");
    let sale = tag_service::create_tag(&state, &staff, named("sale", "Discounted"))
        .await?
        .data
        .expect("tag");
    let new = tag_service::create_tag(&state, &staff, named("new", "Fresh"))
        .await?
        .data
        .expect("tag");

    let product = |name: &str, description: &str, price: &str, categories: Vec<i32>, tags: Vec<i32>| {
        ProductForm {
            name: name.into(),
            description: description.into(),
            price: Some(Decimal::from_str(price).expect("price")),
            categories,
            tags,
        }
    };

    let hoodie = product_service::create_product(
        &state,
        &staff,
        product("Hoodie", "Warm cotton hoodie", "55.00", vec![apparel.id], vec![new.id]),
    )
    .await?
    .data
    .expect("product");
    let mug = product_service::create_product(
        &state,
        &staff,
        product("Mug", "Ceramic, holds coffee", "12.50", vec![kitchen.id, apparel.id], vec![sale.id]),
    )
    .await?
    .data
    .expect("product");
    let book = product_service::create_product(
        &state,
        &staff,
        product("Async Book", "All about 100% COTTON async", "25.00", vec![books.id], vec![new.id, sale.id]),
    )
    .await?
    .data
    .expect("product");

    assert_eq!(mug.categories, vec![apparel.id, kitchen.id]);
    assert_eq!(book.tags, vec![sale.id, new.id]);

    // Unknown relation ids are field errors and nothing is saved.
    let invalid = product_service::create_product(
        &state,
        &staff,
        product("Ghost", "Nope", "1.00", vec![9999], vec![sale.id]),
    )
    .await;
    match invalid {
        Err(AppError::Validation(errors)) => assert_eq!(
            errors.get("categories"),
            Some(&["Select a valid choice. 9999 is not one of the available choices.".to_string()][..])
        ),
        other => panic!("expected validation error, got {:?}", other.map(|r| r.message)),
    }

    // Search is a case-insensitive substring match on name or description.
    let found = product_service::list_products(&state, search(Some("cotton"), None)).await?;
    let names: Vec<String> = found.data.expect("list").items.into_iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["Hoodie".to_string(), "Async Book".to_string()]);

    // Wildcards in the query are literal.
    let found = product_service::list_products(&state, search(Some("100%"), None)).await?;
    assert_eq!(found.data.expect("list").items.len(), 1);

    // Two per page by default; pages past the end are not found.
    let first = product_service::list_products(&state, search(None, None)).await?;
    assert_eq!(first.data.expect("list").items.len(), 2);
    assert_eq!(first.meta.as_ref().and_then(|m| m.num_pages), Some(2));
    let last = product_service::list_products(&state, search(None, Some("last"))).await?;
    assert_eq!(last.data.expect("list").items[0].id, book.id);
    assert!(matches!(
        product_service::list_products(&state, search(None, Some("3"))).await,
        Err(AppError::NotFound)
    ));

    // The catalog shows one product per page and clamps instead of failing.
    let catalog = product_service::catalog(
        &state,
        PageQuery {
            page: Some("99".into()),
            per_page: None,
        },
    )
    .await?;
    assert_eq!(catalog.meta.as_ref().and_then(|m| m.page), Some(3));
    assert_eq!(catalog.data.expect("catalog").items[0].id, book.id);

    let everything = product_service::index(&state).await?;
    assert_eq!(everything.data.expect("index").items.len(), 3);

    // Related products share a category and exclude the product itself.
    let detail = product_service::get_product(&state, hoodie.id).await?.data.expect("detail");
    assert_eq!(detail.category_id, Some(apparel.id));
    let related: Vec<i32> = detail.related_products.iter().map(|p| p.id).collect();
    assert_eq!(related, vec![mug.id]);

    let category = category_service::get_category(&state, apparel.id).await?.data.expect("category");
    assert_eq!(category.related_products.len(), 2);

    let by_category = product_service::products_by_category(&state, kitchen.id).await?;
    assert_eq!(by_category.data.expect("products").products[0].id, mug.id);
    assert!(matches!(
        product_service::products_by_category(&state, 424242).await,
        Err(AppError::NotFound)
    ));

    let by_tag = product_service::products_by_tag(&state, "sale").await?.data.expect("products");
    let ids: Vec<i32> = by_tag.products.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![mug.id, book.id]);
    assert!(matches!(
        product_service::products_by_tag(&state, "SALE").await,
        Err(AppError::NotFound)
    ));

    let tags = tag_service::list_tags(&state, search(Some("fresh"), None)).await?;
    assert_eq!(tags.data.expect("tags").items[0].id, new.id);

    // Replacing a product replaces its relations.
    let updated = product_service::update_product(
        &state,
        &staff,
        mug.id,
        product("Mug", "Ceramic, holds tea", "13.00", vec![kitchen.id], vec![new.id]),
    )
    .await?
    .data
    .expect("product");
    assert_eq!(updated.categories, vec![kitchen.id]);
    assert_eq!(updated.tags, vec![new.id]);
    assert_eq!(updated.price, Decimal::from_str("13.00")?);

    // Deleting a category only unlinks its products.
    category_service::delete_category(&state, &staff, kitchen.id).await?;
    let mug_after = product_service::get_product(&state, mug.id).await?.data.expect("detail");
    assert!(mug_after.product.categories.is_empty());
    assert_eq!(mug_after.category_id, None);

    product_service::delete_product(&state, &staff, mug.id).await?;
    assert!(matches!(
        product_service::get_product(&state, mug.id).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        product_service::delete_product(&state, &staff, mug.id).await,
        Err(AppError::NotFound)
    ));

    Ok(())
}
