//! Tasks: list, sorting, add form, status change, deletion.

use super::{form_body, FormBody};
use crate::error::AppError;
use crate::extractors::HxRequest;
use crate::model::{NewTask, Priority, Status, StatusChange, Task};
use crate::service::form::{on_submit, Field, FormDefinition, Submission};
use crate::service::{Record, Select};
use crate::sql::Direction;
use crate::state::AppState;
use crate::views;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

pub fn add_task_form() -> FormDefinition {
    FormDefinition::new(vec![
        Field::text("title", "Task name").required(),
        Field::text_area("description", "Task description").required(),
        Field::select("priority", "Priority", Priority::ALL).required(),
        Field::select("status", "Status", Status::ALL)
            .required()
            .default_value(Status::ToDo.as_str()),
    ])
}

fn status_form() -> FormDefinition {
    FormDefinition::new(vec![Field::select("status", "Status", Status::ALL).required()])
}

/// Fragment for htmx callers, whole page otherwise.
async fn render(query: Select<Task>, htmx: bool) -> Result<Html<String>, AppError> {
    let tasks = query.run().await?;
    Ok(Html(if htmx {
        views::tasks::fragment(&tasks)
    } else {
        views::tasks::list(&tasks)
    }))
}

pub async fn list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(Task::table(&state.db).select_all(), false).await
}

pub async fn sort_by_priority(
    State(state): State<AppState>,
    HxRequest(htmx): HxRequest,
) -> Result<Html<String>, AppError> {
    let query = Task::table(&state.db)
        .select_all()
        .order_by("priority", Direction::Desc)
        .order_by("createdAt", Direction::Asc);
    render(query, htmx).await
}

pub async fn sort_by_date(
    State(state): State<AppState>,
    HxRequest(htmx): HxRequest,
) -> Result<Html<String>, AppError> {
    let query = Task::table(&state.db).select_all().order_by("createdAt", Direction::Asc);
    render(query, htmx).await
}

pub async fn add_form() -> Html<String> {
    Html(views::tasks::add(&add_task_form(), &Submission::Pending))
}

pub async fn add(State(state): State<AppState>, body: FormBody) -> Html<String> {
    let definition = add_task_form();
    let submission = on_submit(&definition, form_body(body), |input: NewTask| {
        let table = Task::table(&state.db);
        async move { table.insert(Task::create(input, chrono::Utc::now())).await }
    })
    .await;
    if let Submission::Done(task) = &submission {
        tracing::info!(task = %task.id, "task added");
    }
    Html(views::tasks::add(&definition, &submission))
}

async fn after_change(state: &AppState, htmx: bool) -> Result<Response, AppError> {
    if htmx {
        Ok(render(Task::table(&state.db).select_all(), true).await?.into_response())
    } else {
        Ok(Redirect::to("/task").into_response())
    }
}

pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HxRequest(htmx): HxRequest,
    body: FormBody,
) -> Result<Response, AppError> {
    let change: StatusChange = status_form().parse(&form_body(body)?)?;
    let table = Task::table(&state.db);
    let mut task = table.read(&id).await?;
    task.status = change.status;
    table.update(task).await?;
    tracing::info!(task = %id, status = %change.status, "task status changed");
    after_change(&state, htmx).await
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HxRequest(htmx): HxRequest,
) -> Result<Response, AppError> {
    Task::table(&state.db).delete(&id).await?;
    tracing::info!(task = %id, "task deleted");
    after_change(&state, htmx).await
}
