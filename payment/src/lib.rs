pub mod checkout;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod provider;
pub mod stripe;

pub use checkout::{CheckoutParams, CheckoutSession, PaymentStatus};
pub use error::PaymentError;
pub use provider::PaymentProvider;
