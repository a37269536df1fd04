//! Subcommand implementations. Each takes already-read JSON input and
//! returns the text to print, so the binary only handles IO.

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use serde_json::{Map, Value};

use formseal_core::{FormSeal, HiddenField};
use formseal_types::{FormDescriptor, FormSealError, ParamMap, params_from_json};

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Sign a form descriptor and print the two hidden fields
    Sign {
        /// Print `<input type="hidden">` elements instead of JSON
        #[arg(long)]
        html: bool,
        /// Descriptor JSON file, or `-` for stdin
        input: String,
    },
    /// Verify a submission and print its values and validations
    Verify {
        /// Submitted parameters JSON file, or `-` for stdin
        input: String,
    },
    /// Verify a submission's digest and print the decoded descriptor
    Inspect {
        /// Submitted parameters JSON file, or `-` for stdin
        input: String,
    },
}

impl Commands {
    /// Where the command's JSON input comes from.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Commands::Sign { input, .. }
            | Commands::Verify { input }
            | Commands::Inspect { input } => input,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Sign { .. } => "sign",
            Commands::Verify { .. } => "verify",
            Commands::Inspect { .. } => "inspect",
        }
    }
}

/// Outcome of running a command: text for stdout, or a rejected submission.
#[derive(Debug)]
pub enum Outcome {
    Printed(String),
    Rejected(FormSealError),
}

pub fn run(seal: &FormSeal, command: &Commands, input: &str) -> Result<Outcome> {
    let value: Value = serde_json::from_str(input).context("input is not valid JSON")?;
    match command {
        Commands::Sign { html, .. } => sign(seal, &value, *html).map(Outcome::Printed),
        Commands::Verify { .. } => {
            let params = submission(&value)?;
            Ok(match seal.parse(&params) {
                Ok(parsed) => Outcome::Printed(serde_json::to_string_pretty(&parsed)?),
                Err(err) => Outcome::Rejected(err),
            })
        }
        Commands::Inspect { .. } => {
            let params = submission(&value)?;
            Ok(match seal.open(&params) {
                Ok(descriptor) => Outcome::Printed(serde_json::to_string_pretty(&descriptor)?),
                Err(err) => Outcome::Rejected(err),
            })
        }
    }
}

fn sign(seal: &FormSeal, value: &Value, html: bool) -> Result<String> {
    let descriptor: FormDescriptor =
        serde_json::from_value(value.clone()).context("input is not a form descriptor")?;
    let payload = seal.seal(&descriptor)?;
    if html {
        let lines: Vec<String> = payload
            .hidden_fields()
            .iter()
            .map(HiddenField::to_html)
            .collect();
        return Ok(lines.join("\n"));
    }
    let mut out = Map::new();
    out.insert(seal.data_field().to_string(), Value::from(payload.data()));
    out.insert(seal.hmac_field().to_string(), Value::from(payload.hmac()));
    Ok(serde_json::to_string_pretty(&Value::Object(out))?)
}

fn submission(value: &Value) -> Result<ParamMap> {
    params_from_json(value).ok_or_else(|| anyhow!("submission must be a JSON object"))
}
