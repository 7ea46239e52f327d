//! Response combining: upstream outputs into one downstream prompt

use crate::core::task::Task;

use super::template::{Bindings, Template};

/// Format upstream outputs for substitution into `${previous_responses}`
///
/// One line per response, numbered from zero, in producer order:
/// `"Response 0: <r0>\nResponse 1: <r1>\n"`. Empty input yields an empty
/// string.
pub fn format_previous_responses(responses: &[String]) -> String {
    responses
        .iter()
        .enumerate()
        .map(|(i, response)| format!("Response {}: {}\n", i, response))
        .collect()
}

/// Build the prompt an agent receives for one invocation
///
/// With no upstream outputs the task text is returned unmodified and the
/// template is not applied. Otherwise the rendered combination instructions
/// are appended to the task on a new line, with `${previous_responses}`
/// bound to the formatted upstream block and `${task}` bound to the task
/// text.
pub fn combine(template: &Template, task: &Task, upstream: &[String]) -> String {
    if upstream.is_empty() {
        return task.content().to_string();
    }
    let previous = format_previous_responses(upstream);
    let instructions = template.render(&Bindings {
        previous_responses: &previous,
        task: task.content(),
        ..Bindings::default()
    });
    format!("{}\n{}", task.content(), instructions)
}
