//! Domain records and their table definitions.

pub mod person;
pub mod task;

pub use person::{Gender, NewPerson, Person};
pub use task::{NewTask, Priority, Status, StatusChange, Task};
