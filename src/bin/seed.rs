use rust_decimal::Decimal;
use storefront_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    middleware::auth::{ADMIN_ROLE, Permission, USER_ROLE},
    services::auth_service::hash_password,
};
use uuid::Uuid;

const STAFF_PERMISSIONS: [Permission; 6] = [
    Permission::AddProduct,
    Permission::ChangeProduct,
    Permission::AddCategory,
    Permission::AddTag,
    Permission::AddOrder,
    Permission::ChangeOrder,
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let admin_id = ensure_user(&pool, "admin@example.com", "admin12345", ADMIN_ROLE).await?;
    let staff_id = ensure_user(&pool, "staff@example.com", "staff12345", USER_ROLE).await?;
    grant_permissions(&pool, staff_id, &STAFF_PERMISSIONS).await?;

    let categories = [
        ensure_category(&pool, "Apparel", "Clothes for Rustaceans").await?,
        ensure_category(&pool, "Kitchen", "Mugs and friends").await?,
        ensure_category(&pool, "Books", "Reading material").await?,
    ];
    let tags = [
        ensure_tag(&pool, "new", "Recently added").await?,
        ensure_tag(&pool, "sale", "Discounted items").await?,
    ];

    seed_products(&pool, &categories, &tags).await?;

    println!("Seed completed. Admin ID: {admin_id}, Staff ID: {staff_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn grant_permissions(
    pool: &sqlx::PgPool,
    user_id: Uuid,
    permissions: &[Permission],
) -> anyhow::Result<()> {
    for permission in permissions {
        sqlx::query(
            "INSERT INTO user_permissions (user_id, codename) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(permission.codename())
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn ensure_category(pool: &sqlx::PgPool, name: &str, description: &str) -> anyhow::Result<i32> {
    ensure_named(pool, "categories", name, description).await
}

async fn ensure_tag(pool: &sqlx::PgPool, name: &str, description: &str) -> anyhow::Result<i32> {
    ensure_named(pool, "tags", name, description).await
}

// Names are not unique in the schema, so look before inserting.
async fn ensure_named(
    pool: &sqlx::PgPool,
    table: &str,
    name: &str,
    description: &str,
) -> anyhow::Result<i32> {
    let existing: Option<(i32,)> =
        sqlx::query_as(&format!("SELECT id FROM {table} WHERE name = $1 ORDER BY id LIMIT 1"))
            .bind(name)
            .fetch_optional(pool)
            .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as(&format!(
        "INSERT INTO {table} (name, description) VALUES ($1, $2) RETURNING id"
    ))
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

async fn seed_products(pool: &sqlx::PgPool, categories: &[i32; 3], tags: &[i32; 2]) -> anyhow::Result<()> {
    let [apparel, kitchen, books] = *categories;
    let [new, sale] = *tags;
    let products = vec![
        ("Axum Hoodie", "Warm hoodie for Rustaceans", Decimal::new(5500, 2), apparel, new),
        ("Ferris Mug", "Coffee tastes better with Ferris", Decimal::new(1200, 2), kitchen, sale),
        ("Rust Sticker Pack", "Decorate your laptop", Decimal::new(500, 2), apparel, sale),
        ("E-book: Async Rust", "Learn async Rust patterns", Decimal::new(2500, 2), books, new),
    ];

    for (name, desc, price, category_id, tag_id) in products {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        let mut tx = pool.begin().await?;
        let (product_id,): (i32,) = sqlx::query_as(
            "INSERT INTO products (name, description, price) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(name)
        .bind(desc)
        .bind(price)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query("INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO product_tags (product_id, tag_id) VALUES ($1, $2)")
            .bind(product_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    println!("Seeded products");
    Ok(())
}
