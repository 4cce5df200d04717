//! Application layer - Command handlers and service wiring.
//!
//! Handlers orchestrate domain operations through ports. [`runtime`]
//! assembles the live services and owns their background tasks.

pub mod handlers;
pub mod runtime;

pub use handlers::{
    CheckoutOutcome, HandlePaymentConfirmationCommand, HandlePaymentConfirmationHandler,
    OrderCreationPipeline, PaymentConfirmationError, PaymentConfirmationResult,
    SubmitCheckoutCommand, SubmitCheckoutHandler,
};
pub use runtime::{LiveDependencies, LiveServices};
