//! Demo catalog
//!
//! The six reference apiary products, inserted only into an empty catalog.

use rust_decimal::Decimal;
use shared::models::{Product, ProductCategory, ProductCreate, UnitOfMeasure};
use sqlx::SqlitePool;

use super::MaintenanceResult;
use crate::catalog;
use crate::db::repository::product as product_repo;

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: i64,
    stock: i64,
    category: ProductCategory,
    unit: UnitOfMeasure,
}

const DEMO_CATALOG: [DemoProduct; 6] = [
    DemoProduct {
        name: "Miel de Flores Silvestres",
        description: "Miel pura y natural de flores silvestres, cosechada en primavera. Sabor suave y delicado.",
        price: 25000,
        stock: 50,
        category: ProductCategory::Honey,
        unit: UnitOfMeasure::Kg,
    },
    DemoProduct {
        name: "Miel de Eucalipto",
        description: "Miel con propiedades medicinales, ideal para problemas respiratorios. Sabor intenso.",
        price: 28000,
        stock: 30,
        category: ProductCategory::Honey,
        unit: UnitOfMeasure::Kg,
    },
    DemoProduct {
        name: "Polen de Abeja",
        description: "Polen fresco rico en proteínas, vitaminas y minerales. Excelente suplemento nutricional.",
        price: 35000,
        stock: 20,
        category: ProductCategory::Pollen,
        unit: UnitOfMeasure::G,
    },
    DemoProduct {
        name: "Propóleo Puro",
        description: "Propóleo natural con propiedades antibacterianas y antiinflamatorias.",
        price: 45000,
        stock: 15,
        category: ProductCategory::Propolis,
        unit: UnitOfMeasure::Ml,
    },
    DemoProduct {
        name: "Cera de Abeja",
        description: "Cera pura para uso cosmético y artesanal. 100% natural.",
        price: 20000,
        stock: 25,
        category: ProductCategory::Wax,
        unit: UnitOfMeasure::Kg,
    },
    DemoProduct {
        name: "Jalea Real",
        description: "Jalea real fresca, superalimento con múltiples beneficios para la salud.",
        price: 80000,
        stock: 10,
        category: ProductCategory::RoyalJelly,
        unit: UnitOfMeasure::G,
    },
];

/// Insert the demo products when the catalog is empty.
///
/// Returns the inserted products (empty when the catalog already had data).
pub async fn seed_demo_catalog(pool: &SqlitePool) -> MaintenanceResult<Vec<Product>> {
    let existing = product_repo::count(pool).await?;
    if existing > 0 {
        tracing::info!(existing, "Catalog not empty, demo seed skipped");
        return Ok(Vec::new());
    }

    let mut created = Vec::with_capacity(DEMO_CATALOG.len());
    for demo in &DEMO_CATALOG {
        let product = catalog::create_product(
            pool,
            ProductCreate {
                name: demo.name.to_string(),
                description: demo.description.to_string(),
                price: Decimal::from(demo.price),
                stock: demo.stock,
                category: demo.category,
                unit: demo.unit,
                image: None,
            },
        )
        .await?;
        created.push(product);
    }

    tracing::info!(count = created.len(), "Demo catalog seeded");
    Ok(created)
}
