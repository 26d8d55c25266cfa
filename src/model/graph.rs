use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;
use uuid::Uuid;

use super::task::{Task, TaskPatch};
use crate::error::{Result, ScheduleError};

/// Canonical task table: hierarchy and dependencies are plain id references.
///
/// All external mutation goes through [`TaskGraph::batch_update`] (or
/// [`TaskGraph::insert`] for new tasks), which validates the whole batch
/// before anything becomes visible.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,
}

impl TaskGraph {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    /// Every task whose parent chain reaches `id`, breadth-first.
    /// Computed on each call; the result never contains `id` itself.
    pub fn descendants(&self, id: Uuid) -> Vec<Uuid> {
        descendants_in(&self.tasks, id)
    }

    /// Add a new task. Fails on a duplicate id, an inverted date range, or a
    /// parent reference that would close a loop.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.contains(task.id) {
            return Err(ScheduleError::DuplicateTask(task.id));
        }
        validate_range(&task)?;
        if let Some(parent) = task.parent_id {
            // Existing tasks may still point at this id through a stale parent.
            if reaches(&self.tasks, parent, task.id) {
                return Err(ScheduleError::HierarchyCycle {
                    child: task.id,
                    parent,
                });
            }
        }
        debug!(task = %task.id, name = %task.name, "inserting task");
        self.tasks.push(task);
        Ok(())
    }

    /// Apply `(id, patch)` pairs as one unit and return the updated tasks.
    ///
    /// Patches are applied to a staged copy; if any id is unknown or any
    /// touched task ends up with `end < start` or inside its own subtree,
    /// the whole batch is rejected and the graph is left unchanged.
    pub fn batch_update(&mut self, updates: &[(Uuid, TaskPatch)]) -> Result<Vec<Task>> {
        let mut staged = self.tasks.clone();
        let index: HashMap<Uuid, usize> = staged
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id, i))
            .collect();

        let mut touched: Vec<usize> = Vec::new();
        let mut reparented: Vec<usize> = Vec::new();
        for (id, patch) in updates {
            let idx = *index.get(id).ok_or(ScheduleError::UnknownTask(*id))?;
            patch.apply_to(&mut staged[idx]);
            if !touched.contains(&idx) {
                touched.push(idx);
            }
            if patch.parent_id.is_some() && !reparented.contains(&idx) {
                reparented.push(idx);
            }
        }

        for &idx in &touched {
            validate_range(&staged[idx])?;
        }
        for &idx in &reparented {
            let child = staged[idx].id;
            if let Some(parent) = staged[idx].parent_id {
                if reaches(&staged, parent, child) {
                    return Err(ScheduleError::HierarchyCycle { child, parent });
                }
            }
        }

        let updated = touched.iter().map(|&idx| staged[idx].clone()).collect();
        self.tasks = staged;
        Ok(updated)
    }

    /// Return one dependency cycle (as a path of task ids) if any exists.
    /// Dangling dependency ids are ignored.
    pub fn find_dependency_cycle(&self) -> Option<Vec<Uuid>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        let by_id: HashMap<Uuid, &Task> = self.tasks.iter().map(|t| (t.id, t)).collect();
        let mut marks: HashMap<Uuid, Mark> = HashMap::new();

        for root in &self.tasks {
            if marks.contains_key(&root.id) {
                continue;
            }
            // Iterative DFS: (task id, next dependency index).
            let mut stack: Vec<(Uuid, usize)> = vec![(root.id, 0)];
            marks.insert(root.id, Mark::Visiting);

            while let Some((id, next)) = stack.last().copied() {
                let deps = &by_id[&id].dependencies;
                if next >= deps.len() {
                    marks.insert(id, Mark::Done);
                    stack.pop();
                    continue;
                }
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }
                let dep = deps[next];
                if !by_id.contains_key(&dep) {
                    continue;
                }
                match marks.get(&dep) {
                    Some(Mark::Visiting) => {
                        let start = stack.iter().position(|(s, _)| *s == dep).unwrap_or(0);
                        return Some(stack[start..].iter().map(|(s, _)| *s).collect());
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(dep, Mark::Visiting);
                        stack.push((dep, 0));
                    }
                }
            }
        }
        None
    }
}

fn validate_range(task: &Task) -> Result<()> {
    if task.end < task.start {
        return Err(ScheduleError::InvalidDateRange {
            id: task.id,
            start: task.start,
            end: task.end,
        });
    }
    Ok(())
}

/// True when walking up the parent chain from `from` reaches `target`.
fn reaches(tasks: &[Task], from: Uuid, target: Uuid) -> bool {
    let parents: HashMap<Uuid, Option<Uuid>> = tasks.iter().map(|t| (t.id, t.parent_id)).collect();
    let mut seen = HashSet::new();
    let mut cursor = Some(from);
    while let Some(id) = cursor {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        cursor = parents.get(&id).copied().flatten();
    }
    false
}

/// Breadth-first descendant walk over a flat task slice.
pub(crate) fn descendants_in(tasks: &[Task], id: Uuid) -> Vec<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for t in tasks {
        if let Some(parent) = t.parent_id {
            children.entry(parent).or_default().push(t.id);
        }
    }

    let mut out = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::from([id]);
    let mut queue: VecDeque<Uuid> = VecDeque::from([id]);
    while let Some(current) = queue.pop_front() {
        for &child in children.get(&current).into_iter().flatten() {
            if seen.insert(child) {
                out.push(child);
                queue.push_back(child);
            }
        }
    }
    out
}
