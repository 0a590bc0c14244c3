//! Catalog service: search semantics, pagination, and mutation rules
//!
//! Owns every business rule over the product collection. The repository
//! underneath only translates these operations into storage calls.

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{ApiError, ApiResult};
use crate::models::{Product, ProductInput, ProductPage, SearchFilter, SearchQuery};
use crate::repositories::ProductRepository;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_DESCRIPTION_CHARS: usize = 4098;

/// Catalog service over the product collection
#[derive(Clone)]
pub struct CatalogService {
    products: ProductRepository,
}

impl CatalogService {
    /// Create a new catalog service
    pub fn new(products: ProductRepository) -> Self {
        Self { products }
    }

    /// Search the catalog.
    ///
    /// Results are ordered by descending id, newest first. A page past the
    /// end of the result set comes back empty but still reports accurate
    /// totals.
    pub async fn search(&self, query: &SearchQuery) -> ApiResult<ProductPage> {
        let page = query.page.unwrap_or(1);
        let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page < 1 {
            return Err(ApiError::Validation("page must be at least 1".to_string()));
        }
        if page_size < 1 {
            return Err(ApiError::Validation("pageSize must be positive".to_string()));
        }

        let filter = SearchFilter::parse(query.search.as_deref());
        let offset = (page - 1) * page_size;
        let (data, total_count) = self.products.search(&filter, offset, page_size).await?;

        Ok(ProductPage {
            data,
            page,
            total_pages: total_pages(total_count, page_size),
            total_count,
        })
    }

    /// Get a product by id
    pub async fn get(&self, id: i32) -> ApiResult<Product> {
        let record = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound)?;
        Ok(record.product)
    }

    /// Create a product; the system assigns the id. Duplicate names are
    /// permitted.
    pub async fn create(&self, input: ProductInput) -> ApiResult<Product> {
        validate_fields(&input.name, input.price, input.description.as_deref())?;
        Ok(self.products.insert(&input).await?)
    }

    /// Replace an existing product wholesale.
    ///
    /// A concurrent writer that got in between the read and the write
    /// leaves zero rows updated; existence decides whether that is a
    /// conflict or a deletion. Conflicts are surfaced to the client, which
    /// must re-fetch and resubmit.
    pub async fn replace(&self, id: i32, product: Product) -> ApiResult<()> {
        if id != product.id {
            return Err(ApiError::Validation(
                "product id does not match the request path".to_string(),
            ));
        }
        validate_fields(&product.name, product.price, product.description.as_deref())?;

        let current = self
            .products
            .find_by_id(id)
            .await?
            .ok_or(ApiError::NotFound)?;

        let rows = self.products.update(&product, current.version).await?;
        if rows == 0 {
            if self.products.exists(id).await? {
                warn!("Concurrent modification of product {}", id);
                return Err(ApiError::Conflict);
            }
            return Err(ApiError::NotFound);
        }

        Ok(())
    }

    /// Delete a product by id
    pub async fn delete(&self, id: i32) -> ApiResult<()> {
        let rows = self.products.delete(id).await?;
        if rows == 0 {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

fn total_pages(total_count: i64, page_size: i64) -> i64 {
    (total_count + page_size - 1) / page_size
}

fn validate_fields(
    name: &str,
    price: Decimal,
    description: Option<&str>,
) -> ApiResult<()> {
    if name.is_empty() {
        return Err(ApiError::Validation("name is required".to_string()));
    }
    if price < Decimal::ZERO || price > Decimal::from(1000) {
        return Err(ApiError::Validation(
            "price must be between 0 and 1000".to_string(),
        ));
    }
    if let Some(description) = description {
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(ApiError::Validation(
                "description must be at most 4098 characters".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_of_count_over_size() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(50, 50), 1);
        assert_eq!(total_pages(51, 50), 2);
        assert_eq!(total_pages(100, 10), 10);
        assert_eq!(total_pages(101, 10), 11);
    }

    #[test]
    fn valid_fields_pass() {
        assert!(validate_fields("Widget", Decimal::new(9_990, 3), None).is_ok());
        assert!(validate_fields("Widget", Decimal::ZERO, Some("fine")).is_ok());
        assert!(validate_fields("Widget", Decimal::from(1000), None).is_ok());
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            validate_fields("", Decimal::ZERO, None),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn price_outside_range_is_rejected() {
        // One mill either side of the inclusive [0, 1000] range.
        assert!(validate_fields("Widget", Decimal::new(-1, 3), None).is_err());
        assert!(validate_fields("Widget", Decimal::new(1_000_001, 3), None).is_err());
    }

    #[test]
    fn oversized_description_is_rejected() {
        let at_limit = "x".repeat(4098);
        assert!(validate_fields("Widget", Decimal::ZERO, Some(&at_limit)).is_ok());

        let too_long = "x".repeat(4099);
        assert!(validate_fields("Widget", Decimal::ZERO, Some(&too_long)).is_err());
    }
}
