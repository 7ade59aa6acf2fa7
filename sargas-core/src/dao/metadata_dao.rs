use dashmap::DashMap;
use once_cell::sync::Lazy;
use sargas_common::prelude::*;
use sargas_common::{TaskDef, WorkflowDef};

/// Data access layer for the workflow metadata - task definitions and
/// workflow definitions. Read-mostly; readers get their own copies.
pub struct MetadataDao;

static TASK_DEF: Lazy<DashMap<InlineStr, TaskDef>> = Lazy::new(DashMap::new);

static WORKFLOW_DEF: Lazy<DashMap<InlineStr, BTreeMap<i32, WorkflowDef>>> =
    Lazy::new(DashMap::new);

impl MetadataDao {
    /// ******************************************
    /// *************** TaskDef ******************
    /// ******************************************

    pub fn register_task_def(task_def: TaskDef) {
        let task_name = task_def.name.clone();
        TASK_DEF.insert(task_name, task_def);
    }

    pub fn get_task_def(name: &str) -> Option<TaskDef> {
        TASK_DEF.get(&InlineStr::from(name)).map(|x| x.clone())
    }

    pub fn remove_task_def(name: &str) -> SgResult<()> {
        if TASK_DEF.remove(&InlineStr::from(name)).is_none() {
            fmt_err!(
                NotFound,
                "Cannot remove the task: {} - no such task definition",
                name
            )
        } else {
            Ok(())
        }
    }

    /// ******************************************
    /// *************** WorkflowDef **************
    /// ******************************************

    pub fn create_workflow_def(workflow_def: WorkflowDef) -> SgResult<()> {
        if WORKFLOW_DEF
            .get(&workflow_def.name)
            .map(|x| x.value().contains_key(&workflow_def.version))
            .unwrap_or(false)
        {
            return fmt_err!(
                Conflict,
                "Workflow with {}/{} already exists!",
                workflow_def.name,
                workflow_def.version
            );
        }
        Self::insert_or_update_workflow_def(workflow_def);
        Ok(())
    }

    pub fn update_workflow_def(workflow_def: WorkflowDef) {
        Self::insert_or_update_workflow_def(workflow_def);
    }

    fn insert_or_update_workflow_def(workflow_def: WorkflowDef) {
        let workflow_name = workflow_def.name.clone();
        let version = workflow_def.version;

        WORKFLOW_DEF
            .entry(workflow_name)
            .or_default()
            .insert(version, workflow_def);
    }

    pub fn get_workflow_def(name: &str, version: i32) -> Option<WorkflowDef> {
        WORKFLOW_DEF
            .get(&InlineStr::from(name))
            .and_then(|x| x.value().get(&version).cloned())
    }

    pub fn get_latest_workflow_def(name: &str) -> Option<WorkflowDef> {
        WORKFLOW_DEF
            .get(&InlineStr::from(name))
            .and_then(|x| x.value().iter().next_back().map(|(_, def)| def.clone()))
    }

    pub fn get_workflow_def_names() -> Vec<InlineStr> {
        WORKFLOW_DEF.iter().map(|x| x.key().clone()).collect()
    }

    pub fn remove_workflow_def(name: &str, version: i32) -> SgResult<()> {
        let removed = WORKFLOW_DEF
            .get_mut(&InlineStr::from(name))
            .and_then(|mut x| x.remove(&version));
        if removed.is_none() {
            return fmt_err!(
                NotFound,
                "Cannot remove the workflow - no such workflow definition: {} version: {}",
                name,
                version
            );
        }

        // drop the name when no versions remain
        WORKFLOW_DEF.remove_if(&InlineStr::from(name), |_, versions| versions.is_empty());
        Ok(())
    }
}
