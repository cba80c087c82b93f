//! Core type definitions using newtype patterns for type safety.
//!
//! Keeps the two frame tokens distinct at compile time so a member id
//! can never be bound to the allow-flag column.

mod member;
mod record;

pub use member::{AllowFlag, MemberId};
pub use record::{Frame, ScanRecord};
