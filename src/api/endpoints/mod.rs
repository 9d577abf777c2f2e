pub mod appointments;
pub mod auth;
pub mod health;
pub mod messages;
pub mod patients;
pub mod postnatal;
pub mod prenatal;
pub mod reports;
pub mod users;
pub mod wizard;
