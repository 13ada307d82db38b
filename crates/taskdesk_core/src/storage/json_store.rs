use crate::error::TaskError;
use crate::model::Task;
use std::path::{Path, PathBuf};

const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "TASKDESK_STORE_PATH";

/// The task file lives next to the working directory unless overridden.
/// The file is a bare JSON array of task objects; there is no version field.
pub fn store_path() -> PathBuf {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    PathBuf::from(STORE_FILE_NAME)
}

/// A missing file means an empty task list, not an error.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, TaskError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| TaskError::io(err.to_string()))?;
    let tasks =
        serde_json::from_str(&content).map_err(|err| TaskError::invalid_data(err.to_string()))?;

    Ok(tasks)
}

/// Overwrites the whole file with the pretty-printed collection.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), TaskError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| TaskError::io(err.to_string()))?;
    }

    let content = serde_json::to_string_pretty(tasks)
        .map_err(|err| TaskError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| TaskError::io(err.to_string()))
}
