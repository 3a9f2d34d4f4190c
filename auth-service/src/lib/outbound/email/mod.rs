pub mod logging;
pub mod smtp;
pub mod templates;

pub use logging::LogEmailSender;
pub use smtp::SmtpEmailSender;
