//! Raw request command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;
use knowi::ApiRequest;
use serde_json::Value;

use super::key_value;
use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT or DELETE)
    pub method: String,

    /// API path, relative to the API root, e.g. /dashboards
    pub path: String,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Form field as key=value (repeatable)
    #[arg(long = "form", value_name = "KEY=VALUE", conflicts_with = "json")]
    pub form: Vec<String>,

    /// JSON request body
    #[arg(long)]
    pub json: Option<String>,
}

pub async fn run(connection: &ConnectionArgs, out: &Printer, args: CallArgs) -> Result<()> {
    let mut request = match args.method.to_ascii_uppercase().as_str() {
        "GET" => ApiRequest::get(&args.path),
        "POST" => ApiRequest::post(&args.path),
        "PUT" => ApiRequest::put(&args.path),
        "DELETE" => ApiRequest::delete(&args.path),
        other => bail!("unsupported method '{}'", other),
    };

    for pair in &args.query {
        let (key, value) = key_value(pair)?;
        request = request.query_pair(key, value);
    }

    if let Some(body) = &args.json {
        let body: Value = serde_json::from_str(body).context("--json is not valid JSON")?;
        request = request.json(&body)?;
    } else if !args.form.is_empty() {
        let fields = args
            .form
            .iter()
            .map(|pair| key_value(pair))
            .collect::<Result<Vec<_>>>()?;
        let fields: serde_json::Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        request = request.form(&fields)?;
    }

    let client = connection.client()?;
    let response = client
        .execute(&request)
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    out.json(&response.json_or_text()?)
}
