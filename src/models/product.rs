use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::Status;

// ---------------------------------------------------------------------------
// ProductRecord: One row of the product stock sheet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRecord {
    pub product_id: String,
    /// Units currently in the warehouse (`JUMLAH_DIGUDANG`).
    pub in_stock: i64,
    /// Restock once stock falls to this level
    /// (`HARUS_RESTOCK_BILA_JUMLAH_GUDANG_TERSISA`).
    pub restock_threshold: i64,
}

// ---------------------------------------------------------------------------
// ProductAvailability
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub product_id: String,
    pub in_stock: i64,
    pub restock_threshold: i64,
    pub needs_restock: bool,
}

// ---------------------------------------------------------------------------
// ProductSales: Units sold per product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductSales {
    pub product_id: String,
    pub total_quantity: i64,
}

// ---------------------------------------------------------------------------
// CustomerTotal: Spend per customer and tier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomerTotal {
    /// 1-based ordinal of the customer in descending spend order.
    pub rank: usize,
    pub user_id: String,
    pub status: Status,
    pub total_quantity: i64,
    pub total_amount: Decimal,
}
