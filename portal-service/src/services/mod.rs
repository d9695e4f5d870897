pub mod audit;
pub mod auth;
pub mod error;
pub mod gate;
pub mod token;

pub use audit::AuditRecorder;
pub use auth::AuthService;
pub use error::ServiceError;
pub use gate::AccessGate;
pub use token::{Claims, TokenService};
