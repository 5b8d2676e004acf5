//! Validation of workflow and task specs.
//!
//! Nothing reaches the event log without passing these checks. Every issue
//! found is reported, not only the first one.

pub mod dependency;

pub use self::dependency::TaskGraph;

use crate::domain::{TaskSpec, ValidationError, WorkflowSpec, WORKFLOW_API_VERSION};

/// API versions accepted by `validate_workflow_spec`.
pub const SUPPORTED_API_VERSIONS: &[&str] = &[WORKFLOW_API_VERSION];

pub fn is_supported_api_version(version: &str) -> bool {
    SUPPORTED_API_VERSIONS.contains(&version)
}

/// Collects issues for one subject and turns them into a `ValidationError`.
#[derive(Debug)]
struct Report {
    subject: String,
    issues: Vec<String>,
}

impl Report {
    fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            issues: Vec::new(),
        }
    }

    fn push(&mut self, issue: impl Into<String>) {
        self.issues.push(issue.into());
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                subject: self.subject,
                issues: self.issues,
            })
        }
    }
}

/// Checks a workflow spec.
///
/// - the API version is supported
/// - there is at least one task, and every task is valid on its own
/// - the output task, if set, is one of the tasks
/// - every dependency names another task of the workflow
/// - no task depends on itself, and there are no dependency cycles
pub fn validate_workflow_spec(spec: &WorkflowSpec) -> Result<(), ValidationError> {
    let mut report = Report::new("workflow spec");

    match spec.api_version.as_deref() {
        None | Some("") => report.push("api version is required"),
        Some(version) if !is_supported_api_version(version) => {
            report.push(format!("unsupported api version '{version}'"))
        }
        Some(_) => {}
    }

    if spec.tasks.is_empty() {
        report.push("workflow has no tasks");
    }

    if let Some(output) = spec.output_task.as_deref()
        && !output.is_empty()
        && !spec.tasks.contains_key(output)
    {
        report.push(format!("output task '{output}' does not exist"));
    }

    let mut dangling = false;
    for (name, task) in &spec.tasks {
        if name.is_empty() {
            report.push("task name must not be empty");
        }
        if let Err(err) = validate_task_spec(task) {
            for issue in err.issues {
                report.push(format!("task '{name}': {issue}"));
            }
        }
        for dependency in task.requires.keys() {
            if dependency == name {
                report.push(format!("task '{name}' depends on itself"));
            } else if !spec.tasks.contains_key(dependency) {
                dangling = true;
                report.push(format!(
                    "task '{name}' depends on unknown task '{dependency}'"
                ));
            }
        }
    }

    // self-dependencies are reported above; only look for longer cycles
    // once the graph is closed
    if !dangling {
        let mut graph = TaskGraph::new();
        for (name, task) in &spec.tasks {
            graph.add_node(name);
            for dependency in task.requires.keys().filter(|d| *d != name) {
                graph.add_dependency(name, dependency);
            }
        }
        if let Some(cycle) = graph.detect_cycle() {
            report.push(format!("dependency cycle between tasks {cycle:?}"));
        }
    }

    report.finish()
}

/// Checks a single task spec, independent of any workflow.
///
/// - the function reference is set
/// - dependency and input names are non-empty
pub fn validate_task_spec(spec: &TaskSpec) -> Result<(), ValidationError> {
    let mut report = Report::new("task spec");

    if spec.function_ref.trim().is_empty() {
        report.push("function reference is required");
    }
    if spec.requires.keys().any(String::is_empty) {
        report.push("dependency name must not be empty");
    }
    if spec.inputs.keys().any(String::is_empty) {
        report.push("input name must not be empty");
    }

    report.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DependencyKind;
    use rstest::rstest;

    fn valid() -> WorkflowSpec {
        WorkflowSpec::new()
            .with_output("b")
            .with_task("a", TaskSpec::new("someFn"))
            .with_task(
                "b",
                TaskSpec::new("someFn").with_dependency("a", DependencyKind::Data),
            )
    }

    fn issues(spec: &WorkflowSpec) -> Vec<String> {
        validate_workflow_spec(spec).unwrap_err().issues
    }

    #[test]
    fn valid_spec_passes() {
        assert!(validate_workflow_spec(&valid()).is_ok());
    }

    #[rstest]
    #[case::missing_version(None, "api version is required")]
    #[case::unsupported_version(Some("v0"), "unsupported api version 'v0'")]
    fn api_version_is_checked(#[case] version: Option<&str>, #[case] expected: &str) {
        let mut spec = valid();
        spec.api_version = version.map(str::to_string);
        assert_eq!(issues(&spec), vec![expected.to_string()]);
    }

    #[test]
    fn output_task_must_exist() {
        let spec = valid().with_output("nope");
        assert_eq!(issues(&spec), vec!["output task 'nope' does not exist"]);
    }

    #[test]
    fn dangling_dependency_is_rejected() {
        let spec = valid().with_task(
            "c",
            TaskSpec::new("someFn").with_dependency("ghost", DependencyKind::Data),
        );
        assert_eq!(issues(&spec), vec!["task 'c' depends on unknown task 'ghost'"]);
    }

    #[test]
    fn self_dependency_is_rejected() {
        let spec = valid().with_task(
            "c",
            TaskSpec::new("someFn").with_dependency("c", DependencyKind::Data),
        );
        assert_eq!(issues(&spec), vec!["task 'c' depends on itself"]);
    }

    #[test]
    fn cycles_are_rejected() {
        let spec = WorkflowSpec::new()
            .with_task("a", TaskSpec::new("f").with_dependency("b", DependencyKind::Data))
            .with_task("b", TaskSpec::new("f").with_dependency("a", DependencyKind::Control));
        let found = issues(&spec);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("dependency cycle"));
    }

    #[test]
    fn all_issues_are_reported() {
        let mut spec = WorkflowSpec::new()
            .with_output("nope")
            .with_task("a", TaskSpec::default());
        spec.api_version = None;
        assert_eq!(issues(&spec).len(), 3);
    }

    #[test]
    fn empty_workflow_is_rejected() {
        assert_eq!(issues(&WorkflowSpec::new()), vec!["workflow has no tasks"]);
    }

    #[test]
    fn task_needs_function_ref() {
        let err = validate_task_spec(&TaskSpec::default()).unwrap_err();
        assert_eq!(err.issues, vec!["function reference is required"]);
    }

    #[test]
    fn task_dependency_names_must_not_be_empty() {
        let spec = TaskSpec::new("f").with_dependency("", DependencyKind::DynamicOutput);
        assert!(validate_task_spec(&spec).is_err());
    }
}
