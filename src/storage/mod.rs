#[cfg(test)]
mod in_memory;
mod lock;
mod model;
mod reminder_storage;

#[cfg(test)]
pub use in_memory::InMemoryReminderStorage;
pub use lock::StoreLock;
pub use reminder_storage::{JsonFileReminderStorage, ReminderStorage};
