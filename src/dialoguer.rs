use std::fmt;

use dialoguer::{theme::ColorfulTheme, Input};
use error_stack::{IntoReport, Result, ResultExt};

#[derive(Debug)]
pub struct DialoguerError;

impl fmt::Display for DialoguerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dialoguer error")
    }
}

impl std::error::Error for DialoguerError {}

#[derive(Debug, Clone)]
pub struct Dialoguer;

impl Dialoguer {
    /// Free text prompt; an empty answer is accepted.
    pub fn input(prompt_text: String) -> Result<String, DialoguerError> {
        let colorful_theme = &ColorfulTheme::default();
        let mut input = Input::with_theme(colorful_theme);
        let dialog: String = input
            .with_prompt(&prompt_text)
            .allow_empty(true)
            .interact_text()
            .into_report()
            .change_context(DialoguerError)?;

        Ok(dialog)
    }
}
