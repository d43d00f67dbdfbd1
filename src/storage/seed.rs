//! Seed data for the Products/Brands demo service.

use crate::access::Record;
use crate::catalog::{BRANDS_SET, PRODUCTS_SET};
use crate::storage::{EntityStore, MemoryStore, StorageResult};

/// `(ID, Name, Description, Price, BrandID)`
const PRODUCTS: [(i32, &str, &str, f64, i32); 6] = [
    (1, "Notebook Basic", "Notebook Basic 15", 95.0, 1),
    (2, "Notebook Professional", "Notebook Professional 17", 420.0, 1),
    (3, "Monitor Ergo", "Monitor Ergo 24", 150.0, 2),
    (4, "Mouse Optical", "Mouse Optical USB", 15.0, 3),
    (5, "Mouse Wireless", "Mouse Wireless Bluetooth", 25.0, 3),
    (6, "Keyboard Standard", "Keyboard Standard USB", 20.0, 3),
];

/// `(ID, Name, Country)`
const BRANDS: [(i32, &str, &str); 3] = [
    (1, "TechGiant", "USA"),
    (2, "ErgoSoft", "Germany"),
    (3, "SpeedyMouse", "China"),
];

pub fn product_record(id: i32, name: &str, description: &str, price: f64, brand_id: i32) -> Record {
    Record::new()
        .with("ID", id)
        .with("Name", name)
        .with("Description", description)
        .with("Price", price)
        .with("BrandID", brand_id)
}

pub fn brand_record(id: i32, name: &str, country: &str) -> Record {
    Record::new()
        .with("ID", id)
        .with("Name", name)
        .with("Country", country)
}

/// Create the demo collections in `store` and load the seed records
pub fn load_demo_data(store: &MemoryStore) -> StorageResult<()> {
    store.create_collection(PRODUCTS_SET, "ID");
    store.create_collection(BRANDS_SET, "ID");

    for (id, name, description, price, brand_id) in PRODUCTS {
        store.upsert(
            PRODUCTS_SET,
            product_record(id, name, description, price, brand_id),
        )?;
    }
    for (id, name, country) in BRANDS {
        store.upsert(BRANDS_SET, brand_record(id, name, country))?;
    }
    Ok(())
}

/// A fresh store holding the demo data set
pub fn demo_store() -> StorageResult<MemoryStore> {
    let store = MemoryStore::new();
    load_demo_data(&store)?;
    Ok(store)
}
