use crate::schema::TableDefinition;
use crate::service::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Unknown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub age: i64,
    pub gender: Gender,
    pub email_validated: bool,
}

/// Fields accepted by the add-person form.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPerson {
    pub firstname: String,
    pub lastname: String,
    pub age: i64,
    pub email: String,
    pub gender: Gender,
}

impl Person {
    pub fn create(input: NewPerson) -> Self {
        Person {
            id: uuid::Uuid::now_v7().to_string(),
            firstname: input.firstname,
            lastname: input.lastname,
            email: input.email,
            age: input.age,
            gender: input.gender,
            email_validated: false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Record for Person {
    fn definition() -> &'static TableDefinition {
        static DEF: OnceLock<TableDefinition> = OnceLock::new();
        DEF.get_or_init(|| {
            TableDefinition::new("persons", "id")
                .text("id")
                .text("firstname")
                .text("lastname")
                .text("email")
                .number("age")
                .text("gender")
                .boolean("emailValidated")
        })
    }
}
