use crate::model::Person;
use crate::service::form::{FormDefinition, Submission};
use crate::views::{escape, form, layout};

/// One person; the validate button swaps this block with the updated one.
pub fn item(person: &Person) -> String {
    let id = escape(&person.id);
    let validation = if person.email_validated {
        "<li class=\"validated\">Email validated</li>".to_string()
    } else {
        format!(
            "<li><button hx-post=\"/persons/{id}/actions/validate-email\" hx-target=\"#person-{id}\" \
             hx-swap=\"outerHTML\">Validate email</button></li>"
        )
    };
    format!(
        "<ul id=\"person-{id}\"><li>Name: {}</li><li>Age: {}</li><li>Email: {}</li>{}</ul>",
        escape(&person.full_name()),
        person.age,
        escape(&person.email),
        validation
    )
}

pub fn list(persons: &[Person], total: i64) -> String {
    let items: String = persons.iter().map(item).collect();
    let body = format!(
        "<p><a href=\"/persons/actions/add\">Add a person</a></p><p>{} person(s)</p>{}",
        total, items
    );
    layout("Persons", &body)
}

pub fn add(definition: &FormDefinition, submission: &Submission<Person>) -> String {
    let body = format!(
        "{}{}<p><a href=\"/persons\">Back to the list</a></p>",
        form::banner(submission, "New person saved"),
        form::form(definition, "Send")
    );
    layout("Add a person", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;

    fn jane() -> Person {
        Person {
            id: "a-b-c-d".into(),
            firstname: "Jane".into(),
            lastname: "<Doe>".into(),
            email: "j@x.com".into(),
            age: 30,
            gender: Gender::Female,
            email_validated: false,
        }
    }

    #[test]
    fn unvalidated_person_offers_validation() {
        let html = item(&jane());
        assert!(html.contains("Name: Jane &lt;Doe&gt;"));
        assert!(html.contains("hx-post=\"/persons/a-b-c-d/actions/validate-email\""));
    }

    #[test]
    fn validated_person_has_no_button() {
        let mut p = jane();
        p.email_validated = true;
        assert!(!item(&p).contains("<button"));
    }
}
