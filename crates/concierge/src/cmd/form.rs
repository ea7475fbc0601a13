use anyhow::Result;
use clap::Args;
use concierge_form::answers_schema;

use crate::intake::interest_form;

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Print the JSON schema of the answers instead of the form definition
    #[arg(long = "schema", default_value_t = false)]
    pub schema: bool,
}

pub fn run(args: FormArgs) -> Result<()> {
    let form = interest_form();
    let value = if args.schema {
        answers_schema(&form)
    } else {
        serde_json::to_value(&form)?
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
