pub mod appointments;
pub mod messages;
pub mod patients;
pub mod postnatal;
pub mod prenatal;
pub mod users;

pub use appointments::*;
pub use messages::*;
pub use patients::*;
pub use postnatal::*;
pub use prenatal::*;
pub use users::*;
