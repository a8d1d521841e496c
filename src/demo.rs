//! Sample router units shipped with the binary.
//!
//! Each answers `GET /` with a fixed listing. They pair with the `routes/`
//! tree in the repository root:
//!
//! ```text
//! routes/users/route.toml           router = "users"          → /api/users/
//! routes/users/profile/route.toml   router = "users.profile"  → /api/users/profile/
//! routes/users/address/route.toml   router = "users.address"  → /api/users/address/
//! routes/products/route.toml        router = "products"       → /api/products/
//! ```

use axum::Json;
use serde_json::{json, Value};

use crate::routing::{RouterUnit, UnitRegistry};

async fn users() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "John Doe", "email": "john@example.com", "active": true },
        { "id": 2, "name": "Jane Smith", "email": "jane@example.com", "active": true },
        { "id": 3, "name": "Bob Johnson", "email": "bob@example.com", "active": true },
    ]))
}

async fn profiles() -> Json<Value> {
    Json(json!([
        { "user_id": 1, "bio": "Software engineer", "location": "San Francisco" },
        { "user_id": 2, "bio": "Product manager", "location": "New York" },
        { "user_id": 3, "bio": "Designer", "location": "Los Angeles" },
    ]))
}

async fn addresses() -> Json<Value> {
    Json(json!([
        { "id": 1, "user_id": 1, "city": "San Francisco", "is_primary": true },
        { "id": 2, "user_id": 1, "city": "San Francisco", "is_primary": false },
        { "id": 3, "user_id": 2, "city": "New York", "is_primary": true },
    ]))
}

async fn products() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "Laptop", "price": 999.99, "category": "Electronics" },
        { "id": 2, "name": "Coffee Mug", "price": 15.99, "category": "Home" },
        { "id": 3, "name": "Book", "price": 29.99, "category": "Books" },
    ]))
}

/// Registry holding every sample unit.
pub fn registry() -> UnitRegistry {
    UnitRegistry::new()
        .with("users", || RouterUnit::new("users").get("/", users))
        .with("users.profile", || RouterUnit::new("users.profile").get("/", profiles))
        .with("users.address", || RouterUnit::new("users.address").get("/", addresses))
        .with("products", || RouterUnit::new("products").get("/", products))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_units_are_well_formed() {
        let registry = registry();
        assert_eq!(registry.len(), 4);
        for name in ["users", "users.profile", "users.address", "products"] {
            let unit = registry.build(name).unwrap();
            assert!(unit.defects().is_empty(), "{name}: {:?}", unit.defects());
        }
    }
}
