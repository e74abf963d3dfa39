pub mod tag;
pub mod task;
pub mod user;

pub use tag::Tag;
pub use task::{NewTask, Task, TaskChanges, TaskInput};
pub use user::{NewUser, User};
