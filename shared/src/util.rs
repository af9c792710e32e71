/// Generate a new order id (UUID v4, hyphenated)
pub fn new_order_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
