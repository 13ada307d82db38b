mod task;

pub use task::{Priority, StatusFilter, Task};
