pub mod authz;
pub mod catalog;
pub mod delivery;
pub mod domain;
pub mod error;
pub mod identity;
pub mod memory;
pub mod overview;
pub mod payments;
pub mod ports;
pub mod users;
pub mod validation;

pub use delivery::DeliveryNotifier;
pub use domain::{
    Course, CoursePatch, Decision, ExternalIdentity, NewCourse, Overview, Payment,
    PaymentChannel, PaymentStatus, PaymentSubmission, Role, User,
};
pub use error::{ServiceError, ServiceResult};
pub use memory::InMemoryDatabase;
pub use ports::{
    DatabaseService, ImageStorageService, NotificationService, PaymentFilter, PortError,
    PortResult,
};
