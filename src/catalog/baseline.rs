//! The compiled-in seed catalog.

use rust_decimal::Decimal;

use crate::domain::product::{derive_image, Product, ProductId};

/// Highest id in the seed list; locally-added products get ids above this.
pub const BASELINE_MAX_ID: u32 = 42;

fn seed(id: u32, name: &str, price: i64, category: &str) -> Product {
    Product::new(id, name, category, Decimal::from(price))
}

fn seed_img(id: u32, name: &str, price: i64, category: &str, image: &str) -> Product {
    let mut product = seed(id, name, price, category);
    product.image = Some(image.to_string());
    product
}

/// The fixed seed product list. Already grouped by category in shelf order;
/// images default to the first-word convention unless given explicitly.
pub fn baseline() -> Vec<Product> {
    vec![
        // Snacks
        seed_img(1, "Chippy", 10, "Snacks", "/images/chippy.jpg"),
        seed_img(2, "Piattos", 15, "Snacks", "/images/piattos.png"),
        seed_img(3, "Nova", 12, "Snacks", "/images/nova.jpg"),
        seed(4, "Oishi", 8, "Snacks"),
        seed(5, "Clover Chips", 20, "Snacks"),
        // Drinks
        seed(6, "Coca Cola", 15, "Drinks"),
        seed(7, "Sprite", 15, "Drinks"),
        seed(8, "Royal", 15, "Drinks"),
        seed(9, "Pepsi", 15, "Drinks"),
        seed(10, "Mountain Dew", 15, "Drinks"),
        seed(11, "Zesto", 12, "Drinks"),
        seed(12, "C2", 18, "Drinks"),
        // Condiments
        seed(13, "Silver Swan Soy Sauce", 25, "Condiments"),
        seed(14, "Datu Puti Vinegar", 20, "Condiments"),
        seed(15, "Mang Tomas", 35, "Condiments"),
        seed(16, "Jufran Banana Ketchup", 30, "Condiments"),
        seed(17, "Knorr Seasoning", 5, "Condiments"),
        seed(39, "Bawang", 8, "Condiments"),
        seed(40, "Sibuyas", 8, "Condiments"),
        seed(41, "Vetsin", 5, "Condiments"),
        seed(42, "Magic Sarap", 6, "Condiments"),
        // Biscuits
        seed(18, "Rebisco", 12, "Biscuits"),
        seed(19, "Skyflakes", 15, "Biscuits"),
        seed(20, "Fita", 15, "Biscuits"),
        seed(21, "Cracklings", 10, "Biscuits"),
        seed(22, "M.Y. San Grahams", 18, "Biscuits"),
        // Candies
        seed(23, "Chocnut", 5, "Candies"),
        seed(24, "Hany", 5, "Candies"),
        seed(25, "Maxx", 5, "Candies"),
        seed(26, "Stick-O", 8, "Candies"),
        seed(27, "Flat Tops", 5, "Candies"),
        // Canned Goods
        seed(28, "Corned Beef", 45, "Canned Goods"),
        seed(29, "Sardines", 20, "Canned Goods"),
        seed(30, "Tuna Flakes", 35, "Canned Goods"),
        seed(31, "Beef Loaf", 25, "Canned Goods"),
        seed(32, "Spam", 120, "Canned Goods"),
        // Noodles
        seed(33, "Lucky Me Pancit Canton", 12, "Noodles"),
        seed(34, "Lucky Me Beef", 12, "Noodles"),
        seed(35, "Lucky Me Chicken", 12, "Noodles"),
        seed(36, "Payless Pancit Canton", 10, "Noodles"),
        seed(37, "Indomie", 15, "Noodles"),
        seed(38, "Lucky Me Bulalo", 12, "Noodles"),
    ]
}

/// Whether an id belongs to the seed list's numeric range.
pub fn is_baseline_id(id: &ProductId) -> bool {
    matches!(id, ProductId::Local(n) if *n <= BASELINE_MAX_ID)
}
