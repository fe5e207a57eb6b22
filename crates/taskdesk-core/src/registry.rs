use taskdesk_model::TaskId;
use tracing::{debug, trace};

use crate::{error::CoreError, task::TaskRef};

/// Tasks available for invocation, keyed by id.
///
/// Built once at startup and shared with the workflow. Iteration follows
/// registration order.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Vec<(TaskId, TaskRef)>,
}

impl TaskRegistry {
    #[inline]
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Register a task under `id`.
    pub fn register(&mut self, id: impl Into<TaskId>, task: TaskRef) -> Result<(), CoreError> {
        let id = id.into();
        if self.contains(id.as_str()) {
            return Err(CoreError::DuplicateTask(id.to_string()));
        }
        debug!(task = %id, name = task.name(), "task registered");
        self.tasks.push((id, task));
        Ok(())
    }

    /// Builder style [`register`](TaskRegistry::register).
    pub fn with_task(mut self, id: impl Into<TaskId>, task: TaskRef) -> Result<Self, CoreError> {
        self.register(id, task)?;
        Ok(self)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|(tid, _)| tid.as_str() == id)
    }

    /// Look up a task by id.
    pub fn resolve(&self, id: &str) -> Result<TaskRef, CoreError> {
        let task = self
            .tasks
            .iter()
            .find(|(tid, _)| tid.as_str() == id)
            .map(|(_, task)| task.clone())
            .ok_or_else(|| CoreError::TaskNotFound(id.to_string()))?;

        trace!(task = id, "task resolved");
        Ok(task)
    }

    /// All registered tasks in registration order.
    pub fn resolve_all(&self) -> impl Iterator<Item = (&TaskId, &TaskRef)> {
        self.tasks.iter().map(|(id, task)| (id, task))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{i18n::Catalog, task::Task};
    use taskdesk_model::{ArgumentBag, JobSpec};

    struct Named(&'static str);

    impl Task for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn queue_job(&self, _args: &ArgumentBag) -> JobSpec {
            JobSpec::new(self.0)
        }
    }

    fn registry() -> TaskRegistry {
        TaskRegistry::new()
            .with_task("export-report", Arc::new(Named("export_report")))
            .unwrap()
            .with_task("cleanup", Arc::new(Named("cleanup")))
            .unwrap()
    }

    #[test]
    fn registered_tasks_resolve_with_display_name() {
        let registry = registry();
        let catalog = Catalog::new();

        for (id, _) in registry.resolve_all() {
            let task = registry.resolve(id.as_str()).expect("registered task resolves");
            assert!(!task.display_name(&catalog).is_empty());
        }
    }

    #[test]
    fn unknown_task_is_not_found() {
        let registry = registry();
        let err = registry.resolve("missing").err().expect("lookup must fail");
        assert_eq!(err, CoreError::TaskNotFound("missing".into()));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register("cleanup", Arc::new(Named("other")))
            .unwrap_err();
        assert_eq!(err, CoreError::DuplicateTask("cleanup".into()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_all_keeps_registration_order() {
        let registry = registry();
        let ids: Vec<_> = registry.resolve_all().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["export-report", "cleanup"]);
    }
}
