//! Form definitions and submission parsing: required fields, numbers, select options, patterns.

use crate::error::AppError;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::future::Future;

#[derive(Clone, Debug)]
pub enum FieldKind {
    Text,
    TextArea,
    Number { unit: Option<&'static str> },
    /// (value, label) pairs, rendered in order.
    Select { options: Vec<(String, String)> },
}

#[derive(Clone, Debug)]
pub struct Field {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<String>,
    /// Whole-value regex a non-blank submission must match.
    pub pattern: Option<&'static str>,
}

impl Field {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Field {
            name,
            label,
            kind,
            required: false,
            default: None,
            pattern: None,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn text_area(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Number { unit: None })
    }

    pub fn select<I, V>(name: &'static str, label: &'static str, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        let options = options
            .into_iter()
            .map(|v| {
                let v = v.to_string();
                (v.clone(), v)
            })
            .collect();
        Self::new(name, label, FieldKind::Select { options })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        if let FieldKind::Number { unit: u } = &mut self.kind {
            *u = Some(unit);
        }
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct FormDefinition {
    pub fields: Vec<Field>,
}

impl FormDefinition {
    pub fn new(fields: Vec<Field>) -> Self {
        FormDefinition { fields }
    }

    /// Parse submitted values into `T`. Fields are checked in definition order; the
    /// first blank required field fails the whole submission.
    pub fn parse<T: DeserializeOwned>(&self, input: &HashMap<String, String>) -> Result<T, AppError> {
        let mut out = Map::new();
        for field in &self.fields {
            let raw = input.get(field.name).map(|v| v.trim()).unwrap_or("");
            if raw.is_empty() {
                if field.required {
                    return Err(AppError::BadRequest(format!("The field {} is not filled.", field.label)));
                }
                continue;
            }
            if let Some(pattern) = field.pattern {
                let re = Regex::new(&format!("^(?:{})$", pattern))
                    .map_err(|_| AppError::BadRequest(format!("invalid pattern for {}", field.label)))?;
                if !re.is_match(raw) {
                    return Err(AppError::BadRequest(format!("The field {} is not valid.", field.label)));
                }
            }
            let value = match &field.kind {
                FieldKind::Number { .. } => parse_number(field, raw)?,
                FieldKind::Select { options } => {
                    if !options.iter().any(|(v, _)| v == raw) {
                        return Err(AppError::BadRequest(format!(
                            "The field {} must be one of: {}",
                            field.label,
                            options.iter().map(|(v, _)| v.as_str()).collect::<Vec<_>>().join(", ")
                        )));
                    }
                    Value::String(raw.to_string())
                }
                FieldKind::Text | FieldKind::TextArea => Value::String(raw.to_string()),
            };
            out.insert(field.name.to_string(), value);
        }
        serde_json::from_value(Value::Object(out)).map_err(|e| AppError::BadRequest(e.to_string()))
    }
}

/// Integers are kept exact; other numbers go through `f64`, and whole results become integers
/// so they deserialize into integer fields.
fn parse_number(field: &Field, raw: &str) -> Result<Value, AppError> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    let invalid = || AppError::BadRequest(format!("The field {} must be a number.", field.label));
    let f: f64 = raw.parse().map_err(|_| invalid())?;
    if !f.is_finite() {
        return Err(invalid());
    }
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        return Ok(Value::Number((f as i64).into()));
    }
    Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
}

/// State of a form page: not submitted yet, stored, or rejected.
#[derive(Debug)]
pub enum Submission<T> {
    Pending,
    Done(T),
    Failed(AppError),
}

impl<T> Submission<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Submission::Done(_))
    }
}

impl<T> From<Result<T, AppError>> for Submission<T> {
    fn from(r: Result<T, AppError>) -> Self {
        match r {
            Ok(v) => Submission::Done(v),
            Err(e) => Submission::Failed(e),
        }
    }
}

/// Parse a submitted body against `form` and hand the typed input to `handler`.
/// Parse failures and handler errors both end up as `Submission::Failed`.
pub async fn on_submit<I, O, F, Fut>(
    form: &FormDefinition,
    body: Result<HashMap<String, String>, AppError>,
    handler: F,
) -> Submission<O>
where
    I: DeserializeOwned,
    F: FnOnce(I) -> Fut,
    Fut: Future<Output = Result<O, AppError>>,
{
    let input = match body.and_then(|b| form.parse::<I>(&b)) {
        Ok(input) => input,
        Err(e) => return Submission::Failed(e),
    };
    handler(input).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Signup {
        name: String,
        age: i64,
        color: String,
        #[serde(default)]
        note: Option<String>,
    }

    fn form() -> FormDefinition {
        FormDefinition::new(vec![
            Field::text("name", "Name").required(),
            Field::number("age", "Age").required(),
            Field::select("color", "Color", ["red", "blue"]).required(),
            Field::text_area("note", "Note"),
        ])
    }

    fn input(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn parses_typed_input() {
        let parsed: Signup = form()
            .parse(&input(&[("name", "Jane"), ("age", "30"), ("color", "red")]))
            .unwrap();
        assert_eq!(
            parsed,
            Signup {
                name: "Jane".into(),
                age: 30,
                color: "red".into(),
                note: None
            }
        );
    }

    #[test]
    fn blank_required_field_names_its_label() {
        let err = form()
            .parse::<Signup>(&input(&[("name", "  "), ("age", "30"), ("color", "red")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "bad request: The field Name is not filled.");
    }

    #[test]
    fn large_integers_stay_exact() {
        let parsed: Signup = form()
            .parse(&input(&[("name", "Jane"), ("age", "9007199254740993"), ("color", "red")]))
            .unwrap();
        assert_eq!(parsed.age, 9_007_199_254_740_993);
    }

    #[test]
    fn decimals_are_accepted() {
        #[derive(Debug, Deserialize)]
        struct Weight {
            kg: f64,
        }
        let def = FormDefinition::new(vec![Field::number("kg", "Weight").unit("kg").required()]);
        let parsed: Weight = def.parse(&input(&[("kg", "72.5")])).unwrap();
        assert_eq!(parsed.kg, 72.5);
    }

    #[test]
    fn rejects_non_numbers() {
        let err = form()
            .parse::<Signup>(&input(&[("name", "Jane"), ("age", "thirty"), ("color", "red")]))
            .unwrap_err();
        assert!(err.to_string().contains("Age must be a number"));
    }

    #[test]
    fn rejects_unknown_option() {
        let err = form()
            .parse::<Signup>(&input(&[("name", "Jane"), ("age", "30"), ("color", "green")]))
            .unwrap_err();
        assert!(err.to_string().contains("Color must be one of: red, blue"));
    }

    #[test]
    fn pattern_is_matched_against_whole_value() {
        let form = FormDefinition::new(vec![Field::text("code", "Code").pattern("[A-Z]{3}")]);
        assert!(form.parse::<HashMap<String, String>>(&input(&[("code", "ABC")])).is_ok());
        assert!(form.parse::<HashMap<String, String>>(&input(&[("code", "ABCD")])).is_err());
    }

    #[tokio::test]
    async fn on_submit_reports_handler_result() {
        let ok = on_submit(
            &form(),
            Ok(input(&[("name", "Jane"), ("age", "30"), ("color", "blue")])),
            |s: Signup| async move { Ok::<_, AppError>(s.age) },
        )
        .await;
        assert!(matches!(ok, Submission::Done(30)));

        let failed = on_submit(&form(), Err(AppError::BadRequest("bad input format".into())), |s: Signup| async move {
            Ok::<_, AppError>(s.age)
        })
        .await;
        assert!(matches!(failed, Submission::Failed(AppError::BadRequest(_))));
    }
}
