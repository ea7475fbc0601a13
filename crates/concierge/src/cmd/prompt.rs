use std::io::{self, Write};

use anyhow::{Result, bail};
use concierge_form::{FieldKind, FieldSpec, FieldValue};

/// Asks for one field, offering its current value as the default.
pub fn prompt_field(field: &FieldSpec, current: Option<&FieldValue>) -> Result<FieldValue> {
    let title = match &field.help {
        Some(help) => format!("{} ({help})", field.label),
        None => field.label.clone(),
    };
    match field.kind {
        FieldKind::Acknowledgement => prompt_flag(&title, current.and_then(FieldValue::as_flag)),
        FieldKind::Choice => prompt_choice(
            &title,
            field.choices.as_deref().unwrap_or_default(),
            field.required,
            current.and_then(FieldValue::trimmed),
        ),
        FieldKind::Text | FieldKind::Email | FieldKind::Phone | FieldKind::Number => {
            prompt_text(&title, field.required, current.and_then(FieldValue::trimmed))
        }
    }
}

pub fn prompt_text(title: &str, required: bool, default: Option<&str>) -> Result<FieldValue> {
    loop {
        match default {
            Some(value) => print!("{title} [{value}]: "),
            None => print!("{title}: "),
        }
        let input = read_line()?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            if let Some(value) = default {
                return Ok(FieldValue::text(value));
            }
            if required {
                println!("A value is required.");
                continue;
            }
            return Ok(FieldValue::Empty);
        }
        return Ok(FieldValue::text(trimmed));
    }
}

pub fn prompt_flag(title: &str, default: Option<bool>) -> Result<FieldValue> {
    let suffix = match default {
        Some(true) => "[Y/n]",
        Some(false) => "[y/N]",
        None => "[y/n]",
    };
    loop {
        print!("{title} {suffix}: ");
        let input = read_line()?.trim().to_ascii_lowercase();
        if input.is_empty()
            && let Some(value) = default
        {
            return Ok(FieldValue::Flag(value));
        }
        match input.as_str() {
            "y" | "yes" | "true" | "1" => return Ok(FieldValue::Flag(true)),
            "n" | "no" | "false" | "0" => return Ok(FieldValue::Flag(false)),
            _ => println!("Please answer yes or no."),
        }
    }
}

pub fn prompt_choice(
    title: &str,
    choices: &[String],
    required: bool,
    default: Option<&str>,
) -> Result<FieldValue> {
    if choices.is_empty() {
        bail!("{title} has no choices to offer");
    }
    loop {
        println!("{title}:");
        for (idx, choice) in choices.iter().enumerate() {
            println!("  {}. {}", idx + 1, choice);
        }
        match default {
            Some(value) => print!("Select a number or value [{value}]: "),
            None => print!("Select a number or value: "),
        }
        let input = read_line()?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            if let Some(value) = default {
                return Ok(FieldValue::text(value));
            }
            if required {
                println!("A value is required.");
                continue;
            }
            return Ok(FieldValue::Empty);
        }
        if let Ok(n) = trimmed.parse::<usize>()
            && n > 0
            && n <= choices.len()
        {
            return Ok(FieldValue::text(choices[n - 1].clone()));
        }
        if let Some(choice) = choices
            .iter()
            .find(|choice| choice.eq_ignore_ascii_case(trimmed))
        {
            return Ok(FieldValue::text(choice.clone()));
        }
        println!("That is not one of the choices.");
    }
}

pub fn prompt_yes_no(prompt: &str, default_yes: bool) -> Result<bool> {
    let suffix = if default_yes { "[Y/n]" } else { "[y/N]" };
    loop {
        print!("{prompt} {suffix}: ");
        let token = read_line()?.trim().to_ascii_lowercase();
        if token.is_empty() {
            return Ok(default_yes);
        }
        match token.as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer yes or no."),
        }
    }
}

fn read_line() -> Result<String> {
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        bail!("stdin closed");
    }
    Ok(line)
}
