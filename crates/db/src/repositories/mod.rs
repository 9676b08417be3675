//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row invariants
//! (request + junction + clearance creation, clearance update + aggregate
//! re-evaluation) run inside a single transaction owned by the method.

pub mod cart_repo;
pub mod clearance_notification_repo;
pub mod document_repo;
pub mod request_clearance_repo;
pub mod request_repo;
pub mod student_clearance_repo;
pub mod user_repo;

pub use cart_repo::CartRepo;
pub use clearance_notification_repo::ClearanceNotificationRepo;
pub use document_repo::DocumentRepo;
pub use request_clearance_repo::RequestClearanceRepo;
pub use request_repo::RequestRepo;
pub use student_clearance_repo::StudentClearanceRepo;
pub use user_repo::UserRepo;
