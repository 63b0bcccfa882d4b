//! Feedback component: the reference subscriber wired behind the HTTP front end.

pub mod service;

pub use service::{FEEDBACK_SENT, FEEDBACK_STREAM, Feedback, FeedbackService};
