//! Move order model, lifecycle status and API bodies

mod dto;
mod model;
mod status;

pub use dto::{
    CreateOrderRequest, DeleteAction, DeleteOrderResponse, OrderView, SubmitReviewRequest,
    UpdateOrderRequest,
};
pub use model::{Address, MAX_PREFERRED_DATES, Order, Review, preferred_dates_valid};
pub use status::OrderStatus;
