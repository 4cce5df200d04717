//! Ordering command handlers.

mod confirm_payment;
mod create_order;
mod submit_checkout;

pub use confirm_payment::{
    HandlePaymentConfirmationCommand, HandlePaymentConfirmationHandler, PaymentConfirmationError,
    PaymentConfirmationResult,
};
pub use create_order::OrderCreationPipeline;
pub use submit_checkout::{CheckoutOutcome, SubmitCheckoutCommand, SubmitCheckoutHandler};
