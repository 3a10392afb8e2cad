//! Form rendering from a `FormDefinition`, plus the submission banner.

use crate::service::form::{Field, FieldKind, FormDefinition, Submission};
use crate::views::escape;

fn required_attr(field: &Field) -> &'static str {
    if field.required {
        " required"
    } else {
        ""
    }
}

fn render_field(field: &Field) -> String {
    let name = escape(field.name);
    let label = escape(field.label);
    let default = escape(field.default.as_deref().unwrap_or(""));
    let required = required_attr(field);
    let control = match &field.kind {
        FieldKind::Text => format!(
            "<input type=\"text\" autocomplete=\"off\" name=\"{name}\" id=\"{name}\" placeholder=\"{label}\" value=\"{default}\"{required} />"
        ),
        FieldKind::TextArea => format!(
            "<textarea name=\"{name}\" id=\"{name}\" placeholder=\"{label}\"{required}>{default}</textarea>"
        ),
        FieldKind::Number { unit } => format!(
            "<input type=\"number\" step=\"any\" autocomplete=\"off\" name=\"{name}\" id=\"{name}\" placeholder=\"{label}\" value=\"{default}\"{required} />{}",
            escape(unit.unwrap_or(""))
        ),
        FieldKind::Select { options } => {
            let mut opts = String::from("<option value=\"\">---</option>");
            for (value, text) in options {
                let selected = if field.default.as_deref() == Some(value.as_str()) {
                    " selected"
                } else {
                    ""
                };
                opts.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>",
                    escape(value),
                    selected,
                    escape(text)
                ));
            }
            format!("<select name=\"{name}\" id=\"{name}\"{required}>{opts}</select>")
        }
    };
    format!("<div class=\"field\"><label for=\"{name}\">{label}</label><br />{control}</div>")
}

/// POST form posting back to the current URL.
pub fn form(definition: &FormDefinition, submit_label: &str) -> String {
    let fields: String = definition.fields.iter().map(render_field).collect();
    format!(
        "<form method=\"POST\">{}<button type=\"submit\" class=\"success shadow button\">{}</button></form>",
        fields,
        escape(submit_label)
    )
}

pub fn banner<T>(submission: &Submission<T>, done: &str) -> String {
    match submission {
        Submission::Pending => String::new(),
        Submission::Done(_) => format!("<p class=\"done\">{}</p>", escape(done)),
        Submission::Failed(e) => format!("<p class=\"error\">Error: {}</p>", escape(&e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn renders_select_with_default() {
        let def = FormDefinition::new(vec![Field::select("color", "Color", ["red", "blue"])
            .required()
            .default_value("blue")]);
        let html = form(&def, "Send");
        assert!(html.contains("<select name=\"color\" id=\"color\" required>"));
        assert!(html.contains("<option value=\"blue\" selected>blue</option>"));
        assert!(html.contains("<option value=\"red\">red</option>"));
    }

    #[test]
    fn number_field_shows_its_unit() {
        let def = FormDefinition::new(vec![Field::number("age", "Age").unit("years").required()]);
        let html = form(&def, "Send");
        assert!(html.contains("name=\"age\""));
        assert!(html.contains(" required />years</div>"));
    }

    #[test]
    fn banner_reflects_submission() {
        assert_eq!(banner(&Submission::<()>::Pending, "saved"), "");
        assert!(banner(&Submission::Done(()), "saved").contains("saved"));
        let failed: Submission<()> = Submission::Failed(AppError::BadRequest("The field Name is not filled.".into()));
        assert!(banner(&failed, "saved").contains("The field Name is not filled."));
    }
}
