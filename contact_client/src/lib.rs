//! Client side of the contact form: field state, one round trip to the relay,
//! and the single visible outcome.

pub mod form;
pub mod outcome;

pub use form::{ContactForm, Field, FormError, FormFields, DEFAULT_RESET_DELAY};
pub use outcome::Outcome;
