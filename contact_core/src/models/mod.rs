//! Request and response models

pub mod submission;

pub use submission::{ContactSubmission, ErrorBody, SendEmailResponse, ValidSubmission};
