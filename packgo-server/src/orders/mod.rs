//! Order lifecycle: transition rules, side-effect dispatch and the service
//! that ties them to storage

pub mod dispatch;
pub mod messages;
pub mod service;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatch::{DispatchReport, Dispatcher, Effect, Notifier};
pub use service::{Mutation, OrderService};
pub use transition::{DeletePlan, TransitionError};
