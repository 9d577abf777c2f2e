pub mod appointment;
pub mod enums;
pub mod message;
pub mod patient;
pub mod postnatal;
pub mod prenatal;
pub mod user;

pub use appointment::Appointment;
pub use message::{DirectMessage, MessageStats, Notification};
pub use patient::Patient;
pub use postnatal::{BirthRecord, PostpartumRecord, VaccinationRecord};
pub use prenatal::PrenatalRecord;
pub use user::User;
