pub mod age;
pub mod builder;
pub mod controller;
pub mod doctors;
pub mod session;

pub use builder::{FormBuilder, FormSettings};
pub use controller::PatientFormController;
pub use session::{FormSession, FormSessionStore};
