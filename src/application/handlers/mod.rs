//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod ordering;

pub use ordering::{
    CheckoutOutcome, HandlePaymentConfirmationCommand, HandlePaymentConfirmationHandler,
    OrderCreationPipeline, PaymentConfirmationError, PaymentConfirmationResult,
    SubmitCheckoutCommand, SubmitCheckoutHandler,
};
