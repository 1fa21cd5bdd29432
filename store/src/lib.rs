pub mod backend;
pub mod event;
pub mod list;
pub mod models;
pub mod store;

mod memory;
pub use memory::{MemoryBackend, MemoryTasks};

pub use backend::{BackendError, TasksBackend};
pub use event::{ChangeEvent, ChangeFeed, ChangeSender};
pub use list::TaskList;
pub use models::{Profile, Task, TaskDraft, TaskPatch};
pub use store::{StoreError, StoreSnapshot, SyncToken, TaskStore};
