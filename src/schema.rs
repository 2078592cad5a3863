/// Column-name constants for the sales and customer tables.
/// Single source of truth for loader, aggregator and tests.

// ── Sales columns ───────────────────────────────────────────────────────────
pub mod sales {
    pub const ORDER_ID: &str = "order_id";
    pub const ORDER_DATE: &str = "order_date";
    pub const PRODUCT_NAME: &str = "product_name";
    pub const PRODUCT_CATEGORY: &str = "product_category";
    pub const CHANNEL: &str = "channel";
    pub const CUSTOMER_ID: &str = "customer_id";
    pub const CUSTOMER_TYPE: &str = "customer_type";
    pub const REGION: &str = "region";
    pub const QUANTITY: &str = "quantity";
    pub const UNIT_PRICE: &str = "unit_price";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const IS_REPEAT: &str = "is_repeat";

    /// Columns every sales file must carry. `is_repeat` is optional.
    pub const REQUIRED: [&str; 11] = [
        ORDER_ID,
        ORDER_DATE,
        PRODUCT_NAME,
        PRODUCT_CATEGORY,
        CHANNEL,
        CUSTOMER_ID,
        CUSTOMER_TYPE,
        REGION,
        QUANTITY,
        UNIT_PRICE,
        TOTAL_AMOUNT,
    ];

    pub const NUMERIC: [&str; 3] = [QUANTITY, UNIT_PRICE, TOTAL_AMOUNT];
}

// ── Derived columns ─────────────────────────────────────────────────────────
pub mod derived {
    pub const MONTH: &str = "month";
}

// ── Customer columns ────────────────────────────────────────────────────────
pub mod customers {
    pub const CUSTOMER_ID: &str = "customer_id";
}

// ── Aggregate output columns ────────────────────────────────────────────────
pub mod agg {
    pub const TOTAL: &str = "total";
    pub const MEAN: &str = "avg";
    pub const COUNT: &str = "count";
    pub const AVG_QUANTITY: &str = "avg_quantity";
    pub const RATE: &str = "rate";
    pub const CATEGORY: &str = "category";
}
