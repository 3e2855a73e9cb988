use crate::domain::money;
use crate::domain::ports::{Page, TransactionalStore};
use crate::domain::product::{NewProduct, Product, ProductId, ProductPatch};
use crate::error::{EngineError, Result};
use crate::infrastructure::in_memory::InMemoryStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Product catalog CRUD. The one rule the engine enforces here is that a
/// product referenced by any order item can no longer be deleted, since the
/// item's price snapshot points back at it.
pub struct CatalogService<S: TransactionalStore = InMemoryStore> {
    store: Arc<S>,
}

impl<S: TransactionalStore> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create(&self, product: NewProduct) -> Result<Product> {
        if product.price < Decimal::ZERO {
            return Err(EngineError::Validation(
                "product price cannot be negative".to_string(),
            ));
        }
        let created = self.store.run_in_transaction(|tables| {
            Ok(tables.insert_product(Product {
                id: 0,
                name: product.name,
                description: product.description,
                price: money::to_money(product.price),
                stock: product.stock,
            }))
        })?;
        info!(product_id = created.id, name = %created.name, "product created");
        Ok(created)
    }

    pub fn get(&self, product_id: ProductId) -> Result<Product> {
        self.store.read(|tables| {
            tables
                .products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| EngineError::not_found("product", product_id))
        })
    }

    pub fn update(&self, product_id: ProductId, patch: ProductPatch) -> Result<Product> {
        self.store.run_in_transaction(|tables| {
            let product = tables
                .products
                .get_mut(&product_id)
                .ok_or_else(|| EngineError::not_found("product", product_id))?;
            if let Some(name) = patch.name {
                product.name = name;
            }
            if let Some(description) = patch.description {
                product.description = description;
            }
            if let Some(price) = patch.price {
                if price < Decimal::ZERO {
                    return Err(EngineError::Validation(
                        "product price cannot be negative".to_string(),
                    ));
                }
                product.price = money::to_money(price);
            }
            if let Some(stock) = patch.stock {
                product.stock = stock;
            }
            Ok(product.clone())
        })
    }

    pub fn delete(&self, product_id: ProductId) -> Result<()> {
        self.store.run_in_transaction(|tables| {
            if !tables.products.contains_key(&product_id) {
                return Err(EngineError::not_found("product", product_id));
            }
            if tables.product_is_ordered(product_id) {
                return Err(EngineError::InvalidState(
                    "product has been ordered and cannot be deleted".to_string(),
                ));
            }
            tables.products.remove(&product_id);
            Ok(())
        })?;
        info!(product_id, "product deleted");
        Ok(())
    }

    pub fn list(&self, page: u32, per_page: u32) -> Page<Product> {
        self.store.read(|tables| {
            let rows: Vec<Product> = tables.products.values().cloned().collect();
            Page::slice(rows, page, per_page)
        })
    }
}
