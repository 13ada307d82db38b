use crate::error::TaskError;
use crate::model::{Priority, StatusFilter, Task};
use crate::storage::json_store;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

/// Result of opening a store with degradation: unreadable or malformed
/// content yields an empty store plus the error that caused the fallback,
/// so the caller can log it without the process dying over a bad file.
#[derive(Debug)]
pub struct StoreLoad {
    pub store: TaskStore,
    pub error: Option<TaskError>,
}

/// In-memory owner of the task collection, mirrored to a JSON file on every
/// mutation. The file is a derived copy; this struct is the authority for
/// the lifetime of the process.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Strict open: a missing file is an empty store, anything unreadable is
    /// an error.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self, TaskError> {
        let path = path.into();
        let tasks = json_store::load_tasks(&path)?;
        Ok(Self { path, tasks })
    }

    /// Open, falling back to an empty collection when the file cannot be
    /// read. The on-disk content is left untouched until the next save.
    pub fn open_with_fallback<P: Into<PathBuf>>(path: P) -> StoreLoad {
        let path = path.into();
        match json_store::load_tasks(&path) {
            Ok(tasks) => StoreLoad {
                store: Self { path, tasks },
                error: None,
            },
            Err(err) => StoreLoad {
                store: Self {
                    path,
                    tasks: Vec::new(),
                },
                error: Some(err),
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Appends a new pending task and persists. The title is taken as given;
    /// rejecting blank input is the presentation layer's job.
    pub fn add(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
    ) -> Result<Task, TaskError> {
        let task = Task {
            id: self.next_id(),
            title: title.to_string(),
            description: description.to_string(),
            priority,
            completed: false,
            created_date: now_stamp()?,
            completed_date: None,
        };

        self.tasks.push(task.clone());
        self.save()?;

        Ok(task)
    }

    /// Flips completion on the first task with this id, stamping or clearing
    /// `completed_date`, and persists. An unknown id is a no-op: nothing is
    /// changed and nothing is written.
    pub fn toggle(&mut self, id: u64) -> Result<Option<Task>, TaskError> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };

        task.completed = !task.completed;
        task.completed_date = if task.completed {
            Some(now_stamp()?)
        } else {
            None
        };
        let updated = task.clone();

        self.save()?;
        Ok(Some(updated))
    }

    /// Removes every task with this id and persists, returning how many were
    /// removed. An absent id removes nothing and is not an error; the file
    /// is rewritten either way.
    pub fn delete(&mut self, id: u64) -> Result<usize, TaskError> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = before - self.tasks.len();

        self.save()?;
        Ok(removed)
    }

    /// Read-only view filtered by completion status. Ordering is whatever
    /// the collection holds; display sorting belongs to the caller.
    pub fn query(&self, filter: StatusFilter) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect()
    }

    /// Full overwrite of the backing file. On failure the in-memory list
    /// keeps its mutation and stays ahead of disk until a later save
    /// succeeds; there is no retry here.
    pub fn save(&self) -> Result<(), TaskError> {
        json_store::save_tasks(&self.path, &self.tasks)
    }

    // One above the highest live id. Counting entries instead would mint a
    // duplicate after a delete.
    fn next_id(&self) -> u64 {
        self.tasks.iter().map(|task| task.id).max().unwrap_or(0) + 1
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Minute-precision local timestamp, e.g. "2026-08-01 09:30". Plain text in
/// the file: string-sortable, not timezone-aware.
fn now_stamp() -> Result<String, TaskError> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::now_utc()
        .to_offset(local_offset())
        .format(format)
        .map_err(|err| TaskError::invalid_data(err.to_string()))
}
