//! Outbound mail: message composition and the transport capability

pub mod message;
pub mod transport;

pub use message::{escape_html, ContactEmail};
pub use transport::{DeliveryId, MailTransport, SmtpMailer, TransportError};
