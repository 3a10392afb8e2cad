use crate::model::{Status, Task};
use crate::service::form::{FormDefinition, Submission};
use crate::views::{escape, form, layout};

pub const LIST_TARGET: &str = "task_list";

fn status_form(task: &Task, id: &str) -> String {
    let options: String = Status::ALL
        .iter()
        .map(|s| {
            let selected = if *s == task.status { " selected" } else { "" };
            format!("<option value=\"{s}\"{selected}>{s}</option>")
        })
        .collect();
    format!(
        "<form method=\"POST\" action=\"/task/{id}/actions/status\" hx-post=\"/task/{id}/actions/status\" \
         hx-target=\"#{LIST_TARGET}\"><select name=\"status\">{options}</select><button type=\"submit\">Change</button></form>"
    )
}

fn item(task: &Task) -> String {
    let id = escape(&task.id);
    format!(
        "<ul id=\"task-{id}\"><li>Task: {}</li><li>Description: {}</li><li>Created on: {}</li>\
         <li>Priority: {}</li><li>Status: {}</li><li>{}</li>\
         <li><form method=\"POST\" action=\"/task/{id}/actions/delete\" hx-post=\"/task/{id}/actions/delete\" \
         hx-target=\"#{LIST_TARGET}\"><button type=\"submit\">Delete</button></form></li></ul>",
        escape(&task.title),
        escape(&task.description),
        escape(&task.created_on()),
        task.priority,
        task.status,
        status_form(task, &id)
    )
}

/// Inner content of the list container, swapped in by the sort buttons.
pub fn fragment(tasks: &[Task]) -> String {
    tasks.iter().map(item).collect()
}

pub fn list(tasks: &[Task]) -> String {
    let body = format!(
        "<p><a href=\"/task/actions/add\">Add a task</a></p>\
         <div><button hx-get=\"/task/sort/priority\" hx-target=\"#{LIST_TARGET}\">Sort by priority</button>\
         <button hx-get=\"/task/sort/date\" hx-target=\"#{LIST_TARGET}\">Sort by date</button></div>\
         <div id=\"{LIST_TARGET}\">{}</div>",
        fragment(tasks)
    );
    layout("Tasks", &body)
}

pub fn add(definition: &FormDefinition, submission: &Submission<Task>) -> String {
    let body = format!(
        "{}{}<p><a href=\"/task\">Back to the list</a></p>",
        form::banner(submission, "New task added"),
        form::form(definition, "Send")
    );
    layout("Add a task", &body)
}
