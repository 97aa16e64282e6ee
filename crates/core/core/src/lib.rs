//! # Day Planner Core
//!
//! This crate provides the foundational types and traits for the Day Planner
//! API. It defines the core data structures (`User`, `Session`,
//! `PlannerEvent`), the error type, and the collaborator traits that storage,
//! cache, CMS and mail adapters implement.

pub mod error;
pub mod mail;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used items at the crate root
pub use error::{PlannerError, PlannerResult};
pub use traits::{ContentSource, Mailer, SessionCache, UserStore};
pub use types::{EmailMessage, NewUser, PlannerEvent, Session, User, UserProfile};
