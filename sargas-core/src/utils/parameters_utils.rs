use either::Either;
use fancy_regex::Regex;
use sargas_common::prelude::*;
use sargas_common::{EnvUtils, TaskDef, WorkflowDef};

use crate::model::WorkflowModel;

/// Parses and resolves the input-parameter expressions in the workflow and
/// task definitions against the workflow's runtime state. Referentially
/// transparent: two resolutions over the same snapshot are identical.
pub struct ParametersUtils;

impl ParametersUtils {
    /// Resolves an expression map into a concrete input map. Definitions at
    /// schema version 1 get shallow substitution, version 2 and above get
    /// nested expressions with path traversal.
    pub fn get_task_input(
        input_params: &HashMap<InlineStr, Object>,
        workflow: &WorkflowModel,
        task_definition: Option<&TaskDef>,
        task_id: Option<&InlineStr>,
    ) -> SgResult<HashMap<InlineStr, Object>> {
        if workflow.schema_version > 1 {
            Self::get_task_input_v2(input_params, workflow, task_definition, task_id)
        } else {
            Ok(Self::get_task_input_v1(input_params, workflow))
        }
    }

    /// Schema version 1: each value is a three-part dotted path,
    /// `workflow.input.name`, `<refName>.input.name` or `<refName>.output.name`.
    /// Anything unresolved comes back as null.
    fn get_task_input_v1(
        input_params: &HashMap<InlineStr, Object>,
        workflow: &WorkflowModel,
    ) -> HashMap<InlineStr, Object> {
        let mut input = HashMap::with_capacity(input_params.len());
        for (param_name, value) in input_params {
            let param_path = value.to_string();
            let components = param_path.split('.').collect::<Vec<_>>();
            if components.len() != 3 {
                // a literal, not a path expression
                input.insert(param_name.clone(), value.clone());
                continue;
            }
            let (source, kind, name) = (components[0], components[1], components[2]);
            let resolved = if source.eq("workflow") {
                workflow.input.get(name).cloned()
            } else {
                match workflow.get_task_by_ref_name(source) {
                    Ok(Some(task)) => {
                        if kind.eq("input") {
                            task.input_data.get(name).cloned()
                        } else {
                            task.output_data.get(name).cloned()
                        }
                    }
                    _ => None,
                }
            };
            input.insert(param_name.clone(), resolved.unwrap_or(Object::Null));
        }
        input
    }

    pub fn get_task_input_v2(
        input_params: &HashMap<InlineStr, Object>,
        workflow: &WorkflowModel,
        task_definition: Option<&TaskDef>,
        task_id: Option<&InlineStr>,
    ) -> SgResult<HashMap<InlineStr, Object>> {
        let mut input_params = input_params.clone();
        if let Some(task_definition) = task_definition {
            task_definition.input_template.iter().for_each(|(k, v)| {
                input_params.entry(k.clone()).or_insert_with(|| v.clone());
            });
        }

        let workflow_params: HashMap<InlineStr, Object> = HashMap::from([
            (InlineStr::from("input"), workflow.input.clone().into()),
            (InlineStr::from("output"), workflow.output.clone().into()),
            (InlineStr::from("status"), workflow.status.as_ref().into()),
            (
                InlineStr::from("workflowId"),
                workflow.workflow_id.clone().into(),
            ),
            (
                InlineStr::from("workflowType"),
                workflow.workflow_type.clone().into(),
            ),
            (InlineStr::from("version"), workflow.version.into()),
            (
                InlineStr::from("correlationId"),
                workflow.correlation_id.clone().into(),
            ),
            (
                InlineStr::from("reasonForIncompletion"),
                workflow.reason_for_incompletion.clone().into(),
            ),
            (
                InlineStr::from("schemaVersion"),
                workflow.schema_version.into(),
            ),
        ]);

        let mut input_map: HashMap<InlineStr, Object> =
            HashMap::from([(InlineStr::from("workflow"), workflow_params.into())]);
        // For a new workflow being started the list of tasks will be empty
        for task in &workflow.tasks {
            let mut task_params: HashMap<InlineStr, Object> = HashMap::default();
            task_params.insert("input".into(), task.input_data.clone().into());
            task_params.insert("output".into(), task.output_data.clone().into());
            task_params.insert("taskType".into(), task.task_type.clone().into());
            task_params.insert("status".into(), task.status.as_ref().into());
            task_params.insert(
                "referenceTaskName".into(),
                task.reference_task_name.clone().into(),
            );
            task_params.insert("retryCount".into(), task.retry_count.into());
            task_params.insert("correlationId".into(), task.correlation_id.clone().into());
            task_params.insert("pollCount".into(), task.poll_count.into());
            task_params.insert("taskDefName".into(), task.task_def_name.clone().into());
            task_params.insert("scheduledTime".into(), task.scheduled_time.into());
            task_params.insert("startTime".into(), task.start_time.into());
            task_params.insert("endTime".into(), task.end_time.into());
            task_params.insert(
                "workflowInstanceId".into(),
                task.workflow_instance_id.clone().into(),
            );
            task_params.insert("taskId".into(), task.task_id.clone().into());
            task_params.insert(
                "reasonForIncompletion".into(),
                task.reason_for_incompletion.clone().into(),
            );
            task_params.insert(
                "callbackAfterSeconds".into(),
                task.callback_after_seconds.into(),
            );
            task_params.insert("workerId".into(), task.worker_id.clone().into());
            input_map.insert(task.reference_task_name.clone(), task_params.into());
        }

        let mut document_context = Either::Left(input_map);
        let mut replaced_task_input =
            Self::replace(input_params, &mut document_context, task_id);
        if let Some(task_definition) = task_definition {
            if !task_definition.input_template.is_empty() {
                // If input for a given key resolves to null, try replacing it
                // with one from inputTemplate, if it exists.
                for (k, v) in replaced_task_input.iter_mut() {
                    if v.is_null() {
                        let value = task_definition
                            .input_template
                            .get(k)
                            .cloned()
                            .unwrap_or(Object::Null);
                        let _ = std::mem::replace(v, value);
                    }
                }
            }
        }
        Ok(replaced_task_input)
    }

    fn replace(
        input: HashMap<InlineStr, Object>,
        document_context: &mut Either<HashMap<InlineStr, Object>, serde_json::Value>,
        task_id: Option<&InlineStr>,
    ) -> HashMap<InlineStr, Object> {
        let mut replace_map = HashMap::with_capacity(input.len());
        for (k, v) in input {
            let new_value = match v {
                Object::String(value) => Self::replace_variables(value, document_context, task_id),
                Object::Map(value) => Self::replace(value, document_context, task_id).into(),
                Object::List(value) => Self::replace_list(value, document_context, task_id).into(),
                v @ _ => v,
            };
            replace_map.insert(k, new_value);
        }
        replace_map
    }

    fn replace_list(
        input_list: Vec<Object>,
        document_context: &mut Either<HashMap<InlineStr, Object>, serde_json::Value>,
        task_id: Option<&InlineStr>,
    ) -> Vec<Object> {
        let mut replace_list = Vec::with_capacity(input_list.len());
        for v in input_list {
            let new_value = match v {
                Object::String(value) => Self::replace_variables(value, document_context, task_id),
                Object::Map(value) => Self::replace(value, document_context, task_id).into(),
                Object::List(value) => Self::replace_list(value, document_context, task_id).into(),
                v @ _ => v,
            };
            replace_list.push(new_value);
        }
        replace_list
    }

    fn replace_variables(
        param_string: InlineStr,
        document_context: &mut Either<HashMap<InlineStr, Object>, serde_json::Value>,
        task_id: Option<&InlineStr>,
    ) -> Object {
        lazy_static! {
            static ref DOLLAR_REGEX: Regex =
                Regex::new(r"(?=(?<!\$)\$\{)|(?<=})").expect("regex compile error");
            static ref DOUBLE_DOLLAR_REGEX: Regex =
                Regex::new(r"\$\$\{").expect("regex compile error");
        }

        // split the string at every expression boundary, keeping the
        // ${...} spans intact
        let mut values = Vec::default();
        let mut matches = DOLLAR_REGEX.find_iter(&param_string);
        let mut last = 0;
        let text = matches.text();
        loop {
            match matches.next() {
                None => {
                    if last >= text.len() {
                        break;
                    } else {
                        values.push(&text[last..]);
                        last = text.len() + 1; // Next call will return None
                    }
                }
                Some(Ok(m)) => {
                    if last != m.start() {
                        values.push(&text[last..m.start()]);
                    }
                    last = m.end();
                }
                Some(Err(e)) => {
                    error!("regex match failed, error: {}", e);
                }
            }
        }

        let mut converted_values: Vec<Object> = Vec::with_capacity(values.len());
        for v in values {
            if v.starts_with("${") && v.ends_with('}') {
                let param_path = &v[2..v.len() - 1];
                // if the paramPath is blank, meaning no value in between ${ and }
                // like ${}, ${  } etc, set the value to empty string
                if param_path.trim().is_empty() {
                    converted_values.push(InlineStr::from("").into());
                    continue;
                }
                if let Some(sys_value) = EnvUtils::get_system_parameters_value(param_path, task_id)
                {
                    converted_values.push(sys_value.into());
                } else {
                    converted_values.push(Object::read(document_context, param_path))
                }
            } else if v.contains("$${") {
                converted_values
                    .push(InlineStr::from(DOUBLE_DOLLAR_REGEX.replace(v, "$${")).into());
            } else {
                converted_values.push(v.into());
            }
        }

        if converted_values.is_empty() {
            return Object::Null;
        }
        // If the parameter String was "v1 v2 v3" then stitch the pieces back
        if converted_values.len() > 1 {
            let mut ret_obj = InlineStr::new();
            for val in converted_values {
                ret_obj.push_str(&val.to_string());
            }
            return ret_obj.into();
        }

        converted_values.remove(0)
    }

    pub fn get_workflow_input(
        workflow_def: &WorkflowDef,
        input_params: &mut HashMap<InlineStr, Object>,
    ) {
        workflow_def.input_template.iter().for_each(|(k, v)| {
            input_params.entry(k.clone()).or_insert_with(|| v.clone());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TaskModel, TaskStatus, WorkflowStatus};

    fn workflow_with_task(schema_version: i32) -> WorkflowModel {
        let mut workflow = WorkflowModel {
            workflow_id: "params_wf".into(),
            correlation_id: "corr".into(),
            workflow_type: "params_wf_def".into(),
            version: 1,
            schema_version,
            tasks: Vec::default(),
            task_to_domain: HashMap::default(),
            input: HashMap::from([(InlineStr::from("city"), Object::from("reykjavik"))]),
            output: HashMap::default(),
            external_input_payload_storage_path: InlineStr::new(),
            external_output_payload_storage_path: InlineStr::new(),
            status: WorkflowStatus::Running,
            reason_for_incompletion: InlineStr::new(),
            failed_task_id: InlineStr::new(),
            failed_reference_task_names: HashSet::default(),
            re_run_from_workflow_id: InlineStr::new(),
            create_time: 0,
            updated_time: 0,
            end_time: 0,
        };
        let mut task = TaskModel::new(TaskStatus::Completed);
        task.task_id = "params_task".into();
        task.reference_task_name = "fetch_ref".into();
        task.output_data
            .insert("temperature".into(), Object::Int(3));
        workflow.tasks.push(task);
        workflow
    }

    #[test]
    fn v2_resolves_nested_paths_and_literals() {
        let workflow = workflow_with_task(2);
        let params = HashMap::from([
            (
                InlineStr::from("city"),
                Object::from("${workflow.input.city}"),
            ),
            (
                InlineStr::from("temp"),
                Object::from("${fetch_ref.output.temperature}"),
            ),
            (InlineStr::from("unit"), Object::from("celsius")),
            (
                InlineStr::from("nested"),
                Object::Map(HashMap::from([(
                    InlineStr::from("again"),
                    Object::from("${workflow.input.city}"),
                )])),
            ),
        ]);

        let resolved =
            ParametersUtils::get_task_input(&params, &workflow, None, None).expect("resolve");
        assert_eq!(resolved.get("city"), Some(&Object::from("reykjavik")));
        assert_eq!(resolved.get("temp"), Some(&Object::Int(3)));
        assert_eq!(resolved.get("unit"), Some(&Object::from("celsius")));
        let nested = resolved.get("nested").and_then(|x| x.as_map()).expect("map");
        assert_eq!(nested.get("again"), Some(&Object::from("reykjavik")));
    }

    #[test]
    fn v2_unresolved_paths_become_null() {
        let workflow = workflow_with_task(2);
        let params = HashMap::from([(
            InlineStr::from("missing"),
            Object::from("${workflow.input.no_such_key}"),
        )]);

        let resolved =
            ParametersUtils::get_task_input(&params, &workflow, None, None).expect("resolve");
        assert_eq!(resolved.get("missing"), Some(&Object::Null));
    }

    #[test]
    fn v2_stitches_mixed_strings() {
        let workflow = workflow_with_task(2);
        let params = HashMap::from([(
            InlineStr::from("greeting"),
            Object::from("hello ${workflow.input.city}!"),
        )]);

        let resolved =
            ParametersUtils::get_task_input(&params, &workflow, None, None).expect("resolve");
        assert_eq!(resolved.get("greeting"), Some(&Object::from("hello reykjavik!")));
    }

    #[test]
    fn v1_shallow_substitution() {
        let workflow = workflow_with_task(1);
        let params = HashMap::from([
            (InlineStr::from("city"), Object::from("workflow.input.city")),
            (
                InlineStr::from("temp"),
                Object::from("fetch_ref.output.temperature"),
            ),
            (
                InlineStr::from("missing"),
                Object::from("workflow.input.absent"),
            ),
            (InlineStr::from("literal"), Object::Int(7)),
        ]);

        let resolved =
            ParametersUtils::get_task_input(&params, &workflow, None, None).expect("resolve");
        assert_eq!(resolved.get("city"), Some(&Object::from("reykjavik")));
        assert_eq!(resolved.get("temp"), Some(&Object::Int(3)));
        assert_eq!(resolved.get("missing"), Some(&Object::Null));
        assert_eq!(resolved.get("literal"), Some(&Object::Int(7)));
    }

    #[test]
    fn input_template_fills_nulls() {
        let workflow = workflow_with_task(2);
        let mut task_def = sargas_common::TaskDef::new("templated_task");
        task_def
            .input_template
            .insert("missing".into(), Object::from("fallback"));
        let params = HashMap::from([(
            InlineStr::from("missing"),
            Object::from("${workflow.input.no_such_key}"),
        )]);

        let resolved = ParametersUtils::get_task_input(&params, &workflow, Some(&task_def), None)
            .expect("resolve");
        assert_eq!(resolved.get("missing"), Some(&Object::from("fallback")));
    }
}

