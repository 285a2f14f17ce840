use serde::Deserialize;

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub struct Task {
    id: u64,
    title: String,
    description: Option<String>,
    done: bool,
}

impl Task {
    pub fn new(id: u64, title: String, description: Option<String>, done: bool) -> Self {
        Self {
            id,
            title,
            description,
            done,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the title of the task.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description of the task, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the task is done.
    pub fn done(&self) -> bool {
        self.done
    }
}

/// Every mutable field of a task. Used for creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub done: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = done;
        self
    }
}

/// Fields to overwrite on an existing task. `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub done: Option<bool>,
}

/// How [`TaskStore::insert`] picks the ID of a new task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdAssignment {
    /// Number of stored tasks plus one. IDs can repeat after a delete.
    #[default]
    SequenceLength,
    /// Highest ID ever handed out plus one. IDs are never reused.
    Monotonic,
}

/// Error type for TaskStore operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TaskStoreError {
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    NotFound(u64),
    /// Represents an attempt to store a task without a title.
    #[error("Task title must not be empty")]
    EmptyTitle,
}

/// In-memory, insertion-ordered collection of tasks.
///
/// Lookups are linear scans. The store has no internal synchronization;
/// callers sharing it across tasks must serialize access.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    id_assignment: IdAssignment,
    highest_id: u64,
}

impl TaskStore {
    pub fn new(id_assignment: IdAssignment) -> Self {
        Self {
            tasks: Vec::new(),
            id_assignment,
            highest_id: 0,
        }
    }

    /// Creates a store holding the sample task the service ships with.
    pub fn with_sample_task(id_assignment: IdAssignment) -> Self {
        let mut store = Self::new(id_assignment);
        store.tasks.push(Task::new(
            1,
            "Complete Lab Activity".to_string(),
            Some("Finish Lab 2".to_string()),
            false,
        ));
        store.highest_id = 1;
        store
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Returns the tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Finds a task by its ID.
    #[tracing::instrument(skip(self))]
    pub fn find_by_id(&self, id: u64) -> Result<&Task, TaskStoreError> {
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .ok_or(TaskStoreError::NotFound(id))
    }

    /// Appends a new task and returns it.
    ///
    /// # Arguments
    ///
    /// * `new_task` - Title, description and completion flag of the task.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task`, or `EmptyTitle` if the title is empty.
    #[tracing::instrument(skip(self))]
    pub fn insert(&mut self, new_task: NewTask) -> Result<Task, TaskStoreError> {
        ensure_title(&new_task.title)?;

        let id = self.next_id();
        let task = Task::new(id, new_task.title, new_task.description, new_task.done);
        self.tasks.push(task.clone());
        self.highest_id = self.highest_id.max(id);
        tracing::debug!(id, "Task inserted");
        Ok(task)
    }

    /// Overwrites the fields present in `changes` and returns the updated task.
    #[tracing::instrument(skip(self))]
    pub fn apply_partial_update(
        &mut self,
        id: u64,
        changes: TaskChanges,
    ) -> Result<Task, TaskStoreError> {
        if let Some(title) = &changes.title {
            ensure_title(title)?;
        }
        let task = self.find_by_id_mut(id)?;

        if let Some(title) = changes.title {
            task.title = title;
        }
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        if let Some(done) = changes.done {
            task.done = done;
        }
        Ok(task.clone())
    }

    /// Overwrites every mutable field of a task. The ID is kept.
    #[tracing::instrument(skip(self))]
    pub fn replace(&mut self, id: u64, new_task: NewTask) -> Result<Task, TaskStoreError> {
        ensure_title(&new_task.title)?;
        let task = self.find_by_id_mut(id)?;

        task.title = new_task.title;
        task.description = new_task.description;
        task.done = new_task.done;
        Ok(task.clone())
    }

    /// Removes a task and returns it.
    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: u64) -> Result<Task, TaskStoreError> {
        let position = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskStoreError::NotFound(id))?;
        Ok(self.tasks.remove(position))
    }

    fn find_by_id_mut(&mut self, id: u64) -> Result<&mut Task, TaskStoreError> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskStoreError::NotFound(id))
    }

    fn next_id(&self) -> u64 {
        match self.id_assignment {
            IdAssignment::SequenceLength => self.tasks.len() as u64 + 1,
            IdAssignment::Monotonic => self.highest_id + 1,
        }
    }
}

fn ensure_title(title: &str) -> Result<(), TaskStoreError> {
    if title.is_empty() {
        return Err(TaskStoreError::EmptyTitle);
    }
    Ok(())
}
