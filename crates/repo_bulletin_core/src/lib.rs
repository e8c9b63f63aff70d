pub mod account;
pub mod authorize;
pub mod bulletin;
pub mod csrf;
pub mod domain;
pub mod error;
pub mod handshake;
pub mod ports;
pub mod session;
pub mod validate;

pub use account::AccountService;
pub use bulletin::BulletinService;
pub use domain::{Bulletin, ProviderProfile, RepoId, RepoRef, Section, StoredBulletin, User, UserId};
pub use error::ServiceError;
pub use handshake::{Handshake, HandshakeError};
pub use ports::{DatabaseService, IdentityProvider, PortError, PortResult};
pub use session::{SessionCodec, SessionError};
pub use validate::ValidationError;
