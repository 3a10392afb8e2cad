use crate::error::AppError;
use crate::views::{escape, layout};

pub fn page(error: &AppError) -> String {
    let body = format!("<p class=\"error\">{}</p>", escape(&error.to_string()).replace('\n', "<br />"));
    layout("Error", &body)
}
