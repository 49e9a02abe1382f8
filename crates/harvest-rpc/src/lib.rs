pub mod channel;
pub mod pb;
pub mod token;
pub mod vacancy;

pub use channel::Environment;
pub use token::OutboundTokenClient;
pub use vacancy::OutboundVacancyClient;
