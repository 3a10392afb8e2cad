pub mod definition;
pub mod validator;

pub use definition::*;
pub use validator::*;
