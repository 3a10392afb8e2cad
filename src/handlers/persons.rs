//! Persons: list, add form, email validation.

use super::{form_body, FormBody};
use crate::error::AppError;
use crate::extractors::HxRequest;
use crate::model::{Gender, NewPerson, Person};
use crate::service::form::{on_submit, Field, FormDefinition, Submission};
use crate::service::Record;
use crate::sql::Direction;
use crate::state::AppState;
use crate::views;
use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};

const EMAIL_PATTERN: &str = r"[^@\s]+@[^@\s]+\.[^@\s]+";

pub fn add_person_form() -> FormDefinition {
    FormDefinition::new(vec![
        Field::text("firstname", "First name").required(),
        Field::text("lastname", "Last name").required(),
        Field::number("age", "Age").unit("years").required(),
        Field::text("email", "Email").required().pattern(EMAIL_PATTERN),
        Field::select("gender", "Gender", Gender::ALL).required(),
    ])
}

pub async fn list(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let query = Person::table(&state.db)
        .select_all()
        .order_by("lastname", Direction::Asc)
        .order_by("firstname", Direction::Asc);
    let persons = query.run().await?;
    let total = query.count().await?;
    Ok(Html(views::persons::list(&persons, total)))
}

pub async fn add_form() -> Html<String> {
    Html(views::persons::add(&add_person_form(), &Submission::Pending))
}

pub async fn add(State(state): State<AppState>, body: FormBody) -> Html<String> {
    let definition = add_person_form();
    let submission = on_submit(&definition, form_body(body), |input: NewPerson| {
        let table = Person::table(&state.db);
        async move { table.insert(Person::create(input)).await }
    })
    .await;
    if let Submission::Done(person) = &submission {
        tracing::info!(person = %person.id, "person added");
    }
    Html(views::persons::add(&definition, &submission))
}

/// Mark the email as validated. htmx callers get the updated person block back.
pub async fn validate_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
    HxRequest(htmx): HxRequest,
) -> Result<Response, AppError> {
    let table = Person::table(&state.db);
    let mut person = table.read(&id).await?;
    person.email_validated = true;
    let person = table.update(person).await?;
    tracing::info!(person = %person.id, "email validated");
    if htmx {
        Ok(Html(views::persons::item(&person)).into_response())
    } else {
        Ok(Redirect::to("/persons").into_response())
    }
}
