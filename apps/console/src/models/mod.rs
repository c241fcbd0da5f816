pub mod application;
pub mod candidate;
pub mod job;
pub mod notification;
pub mod user;

pub use application::{Application, ApplicationFilter, ApplicationStatus, NewApplication};
pub use candidate::{Candidate, NewCandidate, ProfileUpdate};
pub use job::{Job, NewJob};
pub use notification::{Notification, UnreadCount};
pub use user::{Credentials, Registration, Role, User};
