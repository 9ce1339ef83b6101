//! Dependency graph checks.

use std::collections::{HashMap, HashSet, VecDeque};

use super::model::Task;
use crate::error::WorkflowError;

/// Order the tasks so every dependency precedes its dependents.
///
/// Returns indices into `tasks`. Fails on duplicate ids, unknown dependency
/// ids and cycles; a cycle error lists the tasks that could not be ordered,
/// in insertion order.
pub fn topological_order(tasks: &[Task]) -> Result<Vec<usize>, WorkflowError> {
    let deps = dependency_indices(tasks)?;

    let mut in_degree: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (idx, task_deps) in deps.iter().enumerate() {
        for &dep in task_deps {
            dependents[dep].push(idx);
        }
    }

    let mut queue: VecDeque<usize> = (0..tasks.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(tasks.len());
    while let Some(idx) = queue.pop_front() {
        order.push(idx);
        for &next in &dependents[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    if order.len() < tasks.len() {
        let ordered: HashSet<usize> = order.into_iter().collect();
        let remaining = tasks
            .iter()
            .enumerate()
            .filter(|(i, _)| !ordered.contains(i))
            .map(|(_, t)| t.id.clone())
            .collect();
        return Err(WorkflowError::GraphCycle(remaining));
    }
    Ok(order)
}

/// Resolve each task's `depends_on` ids to indices. Repeated ids count once.
pub(crate) fn dependency_indices(tasks: &[Task]) -> Result<Vec<Vec<usize>>, WorkflowError> {
    let mut index = HashMap::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        if index.insert(task.id.as_str(), i).is_some() {
            return Err(WorkflowError::DuplicateTask(task.id.clone()));
        }
    }

    tasks
        .iter()
        .map(|task| {
            let mut resolved = Vec::with_capacity(task.depends_on.len());
            for dep in &task.depends_on {
                let &i = index
                    .get(dep.as_str())
                    .ok_or_else(|| WorkflowError::UnknownDependency {
                        task: task.id.clone(),
                        dependency: dep.clone(),
                    })?;
                if !resolved.contains(&i) {
                    resolved.push(i);
                }
            }
            Ok(resolved)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task::new(id, id, "agent").depends_on(deps.iter().copied())
    }

    #[test]
    fn test_diamond_orders_dependencies_first() {
        let tasks = vec![task("d", &["b", "c"]), task("b", &["a"]), task("c", &["a"]), task("a", &[])];
        let order = topological_order(&tasks).unwrap();
        let pos = |id: &str| order.iter().position(|&i| tasks[i].id == id).unwrap();
        assert!(pos("a") < pos("b"));
        assert!(pos("a") < pos("c"));
        assert!(pos("b") < pos("d"));
        assert!(pos("c") < pos("d"));
    }

    #[test]
    fn test_cycle_reports_remaining_tasks() {
        let tasks = vec![task("a", &[]), task("b", &["c"]), task("c", &["b"]), task("d", &["c"])];
        match topological_order(&tasks) {
            Err(WorkflowError::GraphCycle(ids)) => assert_eq!(ids, vec!["b", "c", "d"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency_is_a_cycle() {
        let tasks = vec![task("a", &["a"])];
        assert!(matches!(topological_order(&tasks), Err(WorkflowError::GraphCycle(_))));
    }

    #[test]
    fn test_unknown_dependency() {
        let tasks = vec![task("a", &["ghost"])];
        match topological_order(&tasks) {
            Err(WorkflowError::UnknownDependency { task, dependency }) => {
                assert_eq!(task, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected unknown dependency, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_task_id() {
        let tasks = vec![task("a", &[]), task("a", &[])];
        assert!(matches!(topological_order(&tasks), Err(WorkflowError::DuplicateTask(id)) if id == "a"));
    }

    #[test]
    fn test_repeated_dependency_counts_once() {
        let tasks = vec![task("a", &[]), task("b", &["a", "a"])];
        let deps = dependency_indices(&tasks).unwrap();
        assert_eq!(deps[1], vec![0]);
        assert_eq!(topological_order(&tasks).unwrap(), vec![0, 1]);
    }
}
