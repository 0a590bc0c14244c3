//! Product repository for database operations
//!
//! Thin adapter between catalog operations and storage. Owns no business
//! rules; search semantics, validation, and conflict policy live in the
//! catalog service. Every call goes through the bounded transient-failure
//! retry in `common::database`.

use sqlx::{PgPool, Row, postgres::PgRow};

use common::database::retry_transient;
use common::error::DatabaseError;

use crate::models::{Product, ProductInput, SearchFilter};

/// A stored product row together with its concurrency version.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub product: Product,
    pub version: i64,
}

/// Product repository for database operations
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new product repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a product by id
    pub async fn find_by_id(&self, id: i32) -> Result<Option<ProductRecord>, DatabaseError> {
        let row = retry_transient(|| async {
            sqlx::query(
                r#"
                SELECT id, name, price, description, version
                FROM products
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
        })
        .await?;

        Ok(row.map(record_from_row))
    }

    /// Filtered, ordered, paginated search plus the total matching count
    pub async fn search(
        &self,
        filter: &SearchFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Product>, i64), DatabaseError> {
        let (rows, total_count) = match filter {
            SearchFilter::None => {
                let rows = retry_transient(|| async {
                    sqlx::query(
                        r#"
                        SELECT id, name, price, description
                        FROM products
                        ORDER BY id DESC
                        LIMIT $1 OFFSET $2
                        "#,
                    )
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
                })
                .await?;

                let count = retry_transient(|| async {
                    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
                        .fetch_one(&self.pool)
                        .await
                })
                .await?;

                (rows, count)
            }
            SearchFilter::Id(id) => {
                let rows = retry_transient(|| async {
                    sqlx::query(
                        r#"
                        SELECT id, name, price, description
                        FROM products
                        WHERE id = $1
                        ORDER BY id DESC
                        LIMIT $2 OFFSET $3
                        "#,
                    )
                    .bind(id)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
                })
                .await?;

                let count = retry_transient(|| async {
                    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = $1")
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await
                })
                .await?;

                (rows, count)
            }
            SearchFilter::Text(term) => {
                let pattern = like_pattern(term);
                let rows = retry_transient(|| async {
                    sqlx::query(
                        r#"
                        SELECT id, name, price, description
                        FROM products
                        WHERE name ILIKE $1 OR description ILIKE $1
                        ORDER BY id DESC
                        LIMIT $2 OFFSET $3
                        "#,
                    )
                    .bind(&pattern)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await
                })
                .await?;

                let count = retry_transient(|| async {
                    sqlx::query_scalar::<_, i64>(
                        r#"
                        SELECT COUNT(*)
                        FROM products
                        WHERE name ILIKE $1 OR description ILIKE $1
                        "#,
                    )
                    .bind(&pattern)
                    .fetch_one(&self.pool)
                    .await
                })
                .await?;

                (rows, count)
            }
        };

        let products = rows.into_iter().map(product_from_row).collect();
        Ok((products, total_count))
    }

    /// Insert a new product and return it with its assigned id
    pub async fn insert(&self, input: &ProductInput) -> Result<Product, DatabaseError> {
        let row = retry_transient(|| async {
            sqlx::query(
                r#"
                INSERT INTO products (name, price, description)
                VALUES ($1, $2, $3)
                RETURNING id, name, price, description
                "#,
            )
            .bind(&input.name)
            .bind(input.price)
            .bind(&input.description)
            .fetch_one(&self.pool)
            .await
        })
        .await?;

        Ok(product_from_row(row))
    }

    /// Full-record overwrite guarded by the row version read at fetch time.
    ///
    /// Returns the number of rows affected: zero means the guard failed,
    /// either because a concurrent writer bumped the version or because the
    /// record is gone. The caller decides which by re-checking existence.
    pub async fn update(
        &self,
        product: &Product,
        expected_version: i64,
    ) -> Result<u64, DatabaseError> {
        let result = retry_transient(|| async {
            sqlx::query(
                r#"
                UPDATE products
                SET name = $2, price = $3, description = $4, version = version + 1
                WHERE id = $1 AND version = $5
                "#,
            )
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(&product.description)
            .bind(expected_version)
            .execute(&self.pool)
            .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a product by id
    pub async fn delete(&self, id: i32) -> Result<u64, DatabaseError> {
        let result = retry_transient(|| async {
            sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await
        })
        .await?;

        Ok(result.rows_affected())
    }

    /// Check whether a product with the given id exists
    pub async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let exists = retry_transient(|| async {
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
        })
        .await?;

        Ok(exists)
    }
}

fn product_from_row(row: PgRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        description: row.get("description"),
    }
}

fn record_from_row(row: PgRow) -> ProductRecord {
    let version = row.get("version");
    ProductRecord {
        product: product_from_row(row),
        version,
    }
}

/// Escape LIKE wildcards so the search term matches as a literal substring.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_term() {
        assert_eq!(like_pattern("widget"), "%widget%");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("100%"), r"%100\%%");
        assert_eq!(like_pattern("a_b"), r"%a\_b%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }
}
