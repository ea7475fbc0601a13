use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use concierge_form::validate_form;

use crate::cmd::answers::AnswersDocument;
use crate::cmd::wizard::describe_errors;
use crate::intake::interest_form;

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Answers file to check against every step of the form
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: PathBuf,
    /// Print the validation result as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let doc = AnswersDocument::load(&args.answers)?;
    let form = interest_form();
    let mut fields = form.empty_fields();
    for (name, value) in doc.field_values()? {
        if !fields.contains_key(&name) {
            bail!("answer `{name}` is not a field of the {} form", form.id);
        }
        fields.insert(name, value);
    }

    let result = validate_form(&form, &fields);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("{}: all {} steps are valid", args.answers.display(), form.steps.len());
    } else {
        println!("{}", describe_errors(&result));
    }
    if !result.valid {
        bail!("{} field(s) failed validation", result.errors.len());
    }
    Ok(())
}
