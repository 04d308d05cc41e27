use uuid::Uuid;

use crate::domain::product::Product;
use crate::usecase::contracts::ProductRepository;
use crate::usecase::error::UsecaseError;

/// Outcome of a stock adjustment, so the caller can decide which alert (if
/// any) to fan out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    Ok,
    Low,
    OutOfStock,
}

pub struct ProductsUseCase<P>
where
    P: ProductRepository,
{
    product_repository: P,
}

impl<P> ProductsUseCase<P>
where
    P: ProductRepository,
{
    pub fn new(product_repository: P) -> Self {
        Self { product_repository }
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, UsecaseError> {
        tracing::debug!("listing products");

        let products = self.product_repository.find_all().await?;

        tracing::debug!(count = products.len(), "retrieved products");
        Ok(products)
    }

    #[tracing::instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: Uuid) -> Result<Product, UsecaseError> {
        let product = self
            .product_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Product".to_string()))?;

        Ok(product)
    }

    /// Applies a stock delta and reports the resulting stock level.
    #[tracing::instrument(skip(self), fields(product_id = %id, delta))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        delta: i32,
    ) -> Result<(Product, StockLevel), UsecaseError> {
        tracing::debug!("adjusting product stock");

        let mut product = self
            .product_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UsecaseError::NotFound("Product".to_string()))?;

        product.adjust_quantity(delta);
        self.product_repository.update(&product).await?;

        let level = if product.is_out_of_stock() {
            StockLevel::OutOfStock
        } else if product.is_low_stock() {
            StockLevel::Low
        } else {
            StockLevel::Ok
        };

        tracing::info!(product_id = %product.id, quantity = product.quantity, ?level, "stock adjusted");
        Ok((product, level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::contracts::MockProductRepository;

    fn sample_product(quantity: i32, reorder_level: i32) -> Product {
        Product::new("Laptop".to_string(), "SKU-LT-01".to_string(), quantity, reorder_level)
    }

    #[tokio::test]
    async fn test_adjust_stock_reports_low_level() {
        let mut product_repo = MockProductRepository::new();
        let product = sample_product(12, 10);
        let id = product.id;

        product_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(product.clone())));
        product_repo.expect_update().times(1).returning(|_| Ok(()));

        let usecase = ProductsUseCase::new(product_repo);
        let (updated, level) = usecase.adjust_stock(id, -4).await.unwrap();

        assert_eq!(updated.quantity, 8);
        assert_eq!(level, StockLevel::Low);
    }

    #[tokio::test]
    async fn test_adjust_stock_reports_out_of_stock() {
        let mut product_repo = MockProductRepository::new();
        let product = sample_product(2, 10);
        let id = product.id;

        product_repo
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(product.clone())));
        product_repo.expect_update().times(1).returning(|_| Ok(()));

        let usecase = ProductsUseCase::new(product_repo);
        let (updated, level) = usecase.adjust_stock(id, -2).await.unwrap();

        assert_eq!(updated.quantity, 0);
        assert_eq!(level, StockLevel::OutOfStock);
    }

    #[tokio::test]
    async fn test_adjust_stock_unknown_product() {
        let mut product_repo = MockProductRepository::new();

        product_repo
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let usecase = ProductsUseCase::new(product_repo);
        let result = usecase.adjust_stock(Uuid::new_v4(), 5).await;

        assert!(matches!(result, Err(UsecaseError::NotFound(_))));
    }
}
