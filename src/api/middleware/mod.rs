//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Identity: trusted caller headers from the auth gateway
//! 2. Audit logger: logs after identity, has user_id

pub mod audit;
pub mod identity;
