pub mod db;
pub mod images;
pub mod mailer;

pub use db::DbAdapter;
pub use images::ImageHostAdapter;
pub use mailer::{LogNotifier, SmtpNotifier};
