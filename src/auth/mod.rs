//! Session handling and role/group authorization.

mod policy;
mod session;

pub use policy::{Group, Resource, can_access, require_access};
pub use session::{Session, SessionStore, User};
