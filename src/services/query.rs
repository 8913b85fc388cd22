use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait,
    QuerySelect, Select,
};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    error::AppResult,
    pagination::{Page, PageError},
};

/// `ILIKE` pattern matching `q` anywhere, with `%`, `_` and `\` taken literally.
pub fn like_pattern(q: &str) -> String {
    let mut escaped = String::with_capacity(q.len() + 2);
    escaped.push('%');
    for ch in q.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// Case-insensitive substring match on either column; matches everything when `q` is blank.
pub fn search_condition<C: ColumnTrait>(q: Option<&str>, name: C, description: C) -> Condition {
    match q.filter(|s| !s.is_empty()) {
        Some(search) => {
            let pattern = like_pattern(search);
            Condition::any()
                .add(Expr::col(name).ilike(pattern.clone()))
                .add(Expr::col(description).ilike(pattern))
        }
        None => Condition::all(),
    }
}

/// Count the rows of `finder`, resolve the requested page against that total and fetch it.
pub async fn fetch_page<E>(
    conn: &DatabaseConnection,
    finder: Select<E>,
    resolve: impl FnOnce(u64) -> Result<Page, PageError>,
) -> AppResult<(Page, Vec<E::Model>)>
where
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync,
{
    let total = finder.clone().count(conn).await?;
    let page = resolve(total)?;
    let items = finder
        .limit(page.per_page)
        .offset(page.offset())
        .all(conn)
        .await?;
    Ok((page, items))
}
