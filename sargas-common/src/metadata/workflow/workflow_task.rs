use super::sub_workflow_params::SubWorkflowParams;
use crate::metadata::tasks::TaskDef;
use crate::prelude::*;
use crate::TaskType;

/// A single node of the workflow blueprint. The tasks defined in the workflow
/// definition are saved as part of `WorkflowDef::tasks`.
#[derive(Clone, Debug)]
pub struct WorkflowTask {
    /// Name of the task, resolves the task definition.
    pub name: InlineStr,
    /// Reference name, unique within the workflow definition. Correlates a
    /// task instance back to this template.
    pub task_reference_name: InlineStr,
    /// Type of task. USER_DEFINED for tasks executed by remote workers, or
    /// one of the built-in task types.
    pub type_: InlineStr,
    /// Description of the task
    pub description: InlineStr,
    /// When set to true the workflow continues even if the task fails. The
    /// status of the task is reflected as COMPLETED_WITH_ERRORS.
    pub optional: bool,
    /// Expression template that defines the input given to the task.
    pub input_parameters: HashMap<InlineStr, Object>,
    /// Time in seconds to wait before making the task available to be polled
    /// by a worker.
    pub start_delay: i32,

    /// DECISION
    /// Name of the key in the resolved task input whose value selects the
    /// branch to run.
    pub case_value_param: InlineStr,
    /// Map where the keys are the possible values of the case parameter, with
    /// values being lists of tasks to be executed.
    pub decision_cases: HashMap<InlineStr, Vec<WorkflowTask>>,
    /// List of tasks to be executed when no matching value is found in
    /// decisionCases.
    pub default_case: Vec<WorkflowTask>,

    /// FORK_JOIN
    pub fork_tasks: Vec<Vec<WorkflowTask>>,
    /// JOIN
    pub join_on: Vec<InlineStr>,

    /// FORK_JOIN_DYNAMIC
    /// Name of the key in the resolved task input holding the list of task
    /// templates to fan out over.
    pub dynamic_fork_tasks_param: InlineStr,
    /// Name of the key in the resolved task input holding the map of
    /// reference name to task input.
    pub dynamic_fork_tasks_input_param_name: InlineStr,

    /// SUB_WORKFLOW
    pub sub_workflow_param: Option<SubWorkflowParams>,

    /// EVENT
    pub sink: InlineStr,

    pub task_definition: Option<TaskDef>,
}

impl WorkflowTask {
    fn children(&self) -> Vec<&Vec<WorkflowTask>> {
        let mut workflow_task_lists = Vec::default();
        match TaskType::of(self.type_.as_str()) {
            TaskType::Decision => {
                workflow_task_lists.extend(self.decision_cases.values());
                workflow_task_lists.push(&self.default_case);
            }
            TaskType::ForkJoin => workflow_task_lists.extend(&self.fork_tasks),
            _ => {}
        }
        workflow_task_lists
    }

    pub fn collect_tasks(&self) -> Vec<&WorkflowTask> {
        let mut tasks = Vec::default();
        tasks.push(self);

        for workflow_task_list in self.children() {
            for workflow_task in workflow_task_list {
                tasks.extend(workflow_task.collect_tasks())
            }
        }
        tasks
    }

    pub fn next<'a>(
        &'a self,
        task_reference_name: &str,
        parent: Option<&'a WorkflowTask>,
    ) -> Option<&WorkflowTask> {
        match TaskType::of(self.type_.as_str()) {
            TaskType::Decision => {
                for workflow_tasks in self.children() {
                    let mut iterator = workflow_tasks.iter();
                    while let Some(task) = iterator.next() {
                        if task.task_reference_name.eq(task_reference_name) {
                            break;
                        }
                        if let Some(next_task) = task.next(task_reference_name, Some(self)) {
                            return Some(next_task);
                        }
                        if task.has(task_reference_name) {
                            break;
                        }
                    }
                    if let Some(next_task) = iterator.next() {
                        return Some(next_task);
                    }
                }
            }
            TaskType::ForkJoin => {
                let mut found = false;
                for workflow_tasks in self.children() {
                    let mut iterator = workflow_tasks.iter();
                    while let Some(task) = iterator.next() {
                        if task.task_reference_name.eq(task_reference_name) {
                            found = true;
                            break;
                        }
                        if let Some(next_task) = task.next(task_reference_name, Some(self)) {
                            return Some(next_task);
                        }
                        if task.has(task_reference_name) {
                            break;
                        }
                    }
                    if let Some(next_task) = iterator.next() {
                        return Some(next_task);
                    }
                    if found && parent.is_some() {
                        // the last task of a fork branch joins, so hand the
                        // lookup back to the enclosing template
                        return parent
                            .expect("checked by is_some")
                            .next(&self.task_reference_name, parent);
                    }
                }
            }
            _ => {}
        }
        None
    }

    pub fn has(&self, task_reference_name: &str) -> bool {
        if self.task_reference_name.eq(task_reference_name) {
            return true;
        }

        match TaskType::of(self.type_.as_str()) {
            TaskType::Decision | TaskType::ForkJoin => {
                for child_x in self.children() {
                    for child in child_x {
                        if child.has(task_reference_name) {
                            return true;
                        }
                    }
                }
            }
            _ => {}
        }
        false
    }
}

impl TryFrom<&serde_json::Value> for WorkflowTask {
    type Error = ErrorCode;
    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        let type_: InlineStr = value
            .get("type")
            .and_then(|x| x.as_str())
            .ok_or(ErrorCode::InvalidInput("type not found"))?
            .trim()
            .into();

        let input_parameters = if let Some(json) = value.get("inputParameters") {
            Object::convert_jsonmap_to_hashmap(
                json.as_object()
                    .ok_or(ErrorCode::InvalidInput("inputParameters invalid"))?,
            )
        } else {
            HashMap::default()
        };

        let (case_value_param, decision_cases, default_case) =
            Self::decision_try_from(&type_, value)?;
        let (fork_tasks, join_on) = Self::fork_join_try_from(&type_, value)?;
        let (dynamic_fork_tasks_param, dynamic_fork_tasks_input_param_name) =
            Self::dynamic_fork_try_from(&type_, value)?;

        let sub_workflow_param = if type_.eq(TaskType::SubWorkflow.as_ref()) {
            Some(SubWorkflowParams::try_from(value.get("subWorkflowParam").ok_or(
                ErrorCode::InvalidInput("subWorkflowParam not found"),
            )?)?)
        } else {
            None
        };

        let task_definition = if let Some(json) = value.get("taskDefinition") {
            Some(TaskDef::try_from(json)?)
        } else {
            None
        };

        Ok(Self {
            name: value
                .get("name")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("name not found"))?
                .trim()
                .into(),
            task_reference_name: value
                .get("taskReferenceName")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("taskReferenceName not found"))?
                .trim()
                .into(),
            type_,
            description: value
                .get("description")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
            optional: value
                .get("optional")
                .unwrap_or(&serde_json::json!(false))
                .as_bool()
                .ok_or(ErrorCode::InvalidInput("optional invalid"))?,
            input_parameters,
            start_delay: value
                .get("startDelay")
                .unwrap_or(&serde_json::json!(0))
                .as_i64()
                .ok_or(ErrorCode::InvalidInput("startDelay invalid"))?
                as i32,
            case_value_param,
            decision_cases,
            default_case,
            fork_tasks,
            join_on,
            dynamic_fork_tasks_param,
            dynamic_fork_tasks_input_param_name,
            sub_workflow_param,
            sink: value
                .get("sink")
                .and_then(|x| x.as_str())
                .unwrap_or("")
                .trim()
                .into(),
            task_definition,
        })
    }
}

impl WorkflowTask {
    pub fn try_from_jsonlist(jsonlist: &Vec<serde_json::Value>) -> SgResult<Vec<Self>> {
        let mut tasks = Vec::with_capacity(jsonlist.len());
        for json in jsonlist {
            tasks.push(json.try_into()?);
        }
        Ok(tasks)
    }

    pub fn try_from_jsonmap(
        jsonmap: &serde_json::Map<String, serde_json::Value>,
    ) -> SgResult<HashMap<InlineStr, Vec<Self>>> {
        let mut tasks = HashMap::with_capacity(jsonmap.len());
        for (k, v) in jsonmap {
            let jsonlist = v
                .as_array()
                .ok_or(ErrorCode::InvalidInput("decisionCases invalid"))?;
            tasks.insert(k.into(), Self::try_from_jsonlist(jsonlist)?);
        }
        Ok(tasks)
    }

    fn decision_try_from(
        type_: &InlineStr,
        value: &serde_json::Value,
    ) -> SgResult<(InlineStr, HashMap<InlineStr, Vec<WorkflowTask>>, Vec<WorkflowTask>)> {
        if type_.eq(TaskType::Decision.as_ref()) {
            let case_value_param: InlineStr = value
                .get("caseValueParam")
                .and_then(|x| x.as_str())
                .ok_or(ErrorCode::InvalidInput("caseValueParam not found"))?
                .trim()
                .into();

            let decision_cases = WorkflowTask::try_from_jsonmap(
                value
                    .get("decisionCases")
                    .and_then(|x| x.as_object())
                    .ok_or(ErrorCode::InvalidInput("decisionCases invalid"))?,
            )?;
            if decision_cases.is_empty() {
                return fmt_err!(InvalidInput, "decisionCases can not be empty");
            }

            let default_case = if let Some(json) = value.get("defaultCase") {
                WorkflowTask::try_from_jsonlist(
                    json.as_array()
                        .ok_or(ErrorCode::InvalidInput("defaultCase invalid"))?,
                )?
            } else {
                Vec::default()
            };
            Ok((case_value_param, decision_cases, default_case))
        } else {
            Ok((InlineStr::default(), HashMap::default(), Vec::default()))
        }
    }

    fn fork_join_try_from(
        type_: &InlineStr,
        value: &serde_json::Value,
    ) -> SgResult<(Vec<Vec<WorkflowTask>>, Vec<InlineStr>)> {
        let fork_tasks = if type_.eq(TaskType::ForkJoin.as_ref()) {
            let mut fork_tasks = Vec::default();
            for branch in value
                .get("forkTasks")
                .and_then(|x| x.as_array())
                .ok_or(ErrorCode::InvalidInput("forkTasks invalid"))?
            {
                let branch = branch
                    .as_array()
                    .ok_or(ErrorCode::InvalidInput("forkTasks branch invalid"))?;
                fork_tasks.push(WorkflowTask::try_from_jsonlist(branch)?);
            }
            if fork_tasks.is_empty() {
                return fmt_err!(InvalidInput, "forkTasks can not be empty");
            }
            fork_tasks
        } else {
            Vec::default()
        };

        let join_on = if type_.eq(TaskType::Join.as_ref()) {
            let mut join_on: Vec<InlineStr> = Vec::default();
            for ref_name in value
                .get("joinOn")
                .and_then(|x| x.as_array())
                .ok_or(ErrorCode::InvalidInput("joinOn invalid"))?
            {
                join_on.push(
                    ref_name
                        .as_str()
                        .ok_or(ErrorCode::InvalidInput("joinOn invalid"))?
                        .trim()
                        .into(),
                );
            }
            join_on
        } else {
            Vec::default()
        };

        Ok((fork_tasks, join_on))
    }

    fn dynamic_fork_try_from(
        type_: &InlineStr,
        value: &serde_json::Value,
    ) -> SgResult<(InlineStr, InlineStr)> {
        if type_.eq(TaskType::ForkJoinDynamic.as_ref()) {
            Ok((
                value
                    .get("dynamicForkTasksParam")
                    .and_then(|x| x.as_str())
                    .ok_or(ErrorCode::InvalidInput("dynamicForkTasksParam not found"))?
                    .trim()
                    .into(),
                value
                    .get("dynamicForkTasksInputParamName")
                    .and_then(|x| x.as_str())
                    .ok_or(ErrorCode::InvalidInput(
                        "dynamicForkTasksInputParamName not found",
                    ))?
                    .trim()
                    .into(),
            ))
        } else {
            Ok((InlineStr::default(), InlineStr::default()))
        }
    }
}
