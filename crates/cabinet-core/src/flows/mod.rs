//! Sub-flows that run beside the main session: registration and password
//! recovery. Each keeps its own step, loading flag and error.

pub mod recovery;
pub mod registration;

pub use self::recovery::{PasswordRecovery, RecoveryState, RecoveryStep};
pub use self::registration::{RegistrationFlow, RegistrationState, RegistrationStep};
