//! Shared query helpers: error mapping and paginated dynamic selects.

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use comhub_core::error::AppError;
use comhub_core::result::AppResult;
use comhub_core::types::pagination::{PageRequest, PageResponse};

/// Builder type used for dynamic filters. Binds are always owned values.
pub type Filter = QueryBuilder<'static, Postgres>;

/// `map_err` adapter for plain database failures.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::database(context, e)
}

/// Whether `err` is a unique violation on `constraint`.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.is_unique_violation() && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Run a filtered `COUNT(*)` and a filtered, ordered, paginated select.
///
/// `from` is the `FROM ...` fragment shared by both statements; `filter`
/// appends the `WHERE` clause and is invoked once per statement.
pub(crate) async fn fetch_page<T>(
    pool: &PgPool,
    columns: &str,
    from: &str,
    filter: impl Fn(&mut Filter),
    order_by: &str,
    page: PageRequest,
    context: &'static str,
) -> AppResult<PageResponse<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count: Filter = QueryBuilder::new(format!("SELECT COUNT(*) {from}"));
    filter(&mut count);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(db_error(context))?;

    let mut select: Filter = QueryBuilder::new(format!("SELECT {columns} {from}"));
    filter(&mut select);
    select.push(order_by);
    select.push(" LIMIT ").push_bind(page.limit());
    select.push(" OFFSET ").push_bind(page.offset());

    let items = select
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(db_error(context))?;

    Ok(PageResponse::new(items, page, total.max(0) as u64))
}

/// Appends `WHERE`/`AND` as conditions are added.
pub(crate) struct Conditions<'a> {
    qb: &'a mut Filter,
    first: bool,
}

impl<'a> Conditions<'a> {
    pub(crate) fn new(qb: &'a mut Filter) -> Self {
        Self { qb, first: true }
    }

    /// Start the next condition and return the builder to finish it.
    pub(crate) fn next(&mut self) -> &mut Filter {
        self.qb.push(if self.first { " WHERE " } else { " AND " });
        self.first = false;
        &mut *self.qb
    }
}
