//! Config command - manage the configuration document.

use anyhow::Result;
use clap::{Args, Subcommand};
use gateway_config::Config;
use serde_json::{json, Value};

use crate::output::{self, OutputFormat, Report};
use crate::service::ServiceContext;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a commented template unless a document exists
    Init,

    /// Validate and show the configuration, secrets masked
    Show,

    /// Show the files under the relay home directory
    Path,
}

/// Execute the config command.
pub async fn execute(args: ConfigArgs, context: &ServiceContext, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::Init => init(context, format).await,
        ConfigCommand::Show => show(context, format).await,
        ConfigCommand::Path => path(context, format),
    }
}

async fn init(context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let loader = context.loader();
    let path = loader.path().display().to_string();

    if loader.write_template().await? {
        Report::new(json!({ "path": path }), format!("Wrote template to {path}"))
            .print(format)
    } else {
        Report::new(
            json!({ "path": path }),
            format!("{path} already exists, left untouched"),
        )
        .print(format)
    }
}

/// Configuration summary with secrets reduced to presence flags
fn summary(config: &Config) -> Value {
    let providers: Vec<Value> = config
        .providers
        .iter()
        .map(|p| {
            json!({
                "name": p.name,
                "baseUrl": p.base_url,
                "models": p.models,
                "transformers": p.transformers().collect::<Vec<_>>(),
            })
        })
        .collect();

    let bindings: serde_json::Map<String, Value> = config
        .router
        .bindings()
        .map(|(slot, target)| (slot.to_string(), json!(target.to_string())))
        .collect();

    json!({
        "host": config.host,
        "port": config.port,
        "url": config.service_url(),
        "timeoutMs": config.timeout_ms,
        "auth": config.secret().is_some(),
        "providers": providers,
        "router": bindings,
        "longContextThreshold": config.router.long_context_threshold,
    })
}

async fn show(context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let config = context.load_config().await?;

    if format == OutputFormat::Json {
        return output::json(&summary(&config));
    }

    output::section("Service");
    output::key_value("URL", &config.service_url());
    output::key_value("Timeout", &format!("{} ms", config.timeout_ms));
    output::status(
        if config.secret().is_some() {
            "secret required"
        } else {
            "no secret, all requests allowed"
        },
        config.secret().is_some(),
    );

    output::section("Providers");
    for provider in &config.providers {
        println!("  {}", provider.name);
        output::key_value("  URL", &provider.base_url);
        output::key_value("  Models", &provider.models.join(", "));
        let transformers: Vec<_> = provider.transformers().collect();
        let transformers = if transformers.is_empty() {
            "auto".to_string()
        } else {
            transformers.join(", ")
        };
        output::key_value("  Transformers", &transformers);
    }

    output::section("Router");
    for (slot, target) in config.router.bindings() {
        output::key_value(slot.as_str(), &target.to_string());
    }
    output::key_value(
        "longContextThreshold",
        &config.router.long_context_threshold.to_string(),
    );
    Ok(())
}

fn path(context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let home = &context.home;
    let paths = json!({
        "home": home.root().display().to_string(),
        "config": home.config_file().display().to_string(),
        "state": home.state_file().display().to_string(),
        "log": home.log_file().display().to_string(),
        "server": context.server_bin.display().to_string(),
    });

    if format == OutputFormat::Json {
        return output::json(&paths);
    }

    if let Some(map) = paths.as_object() {
        for (key, value) in map {
            output::key_value(key, value.as_str().unwrap_or_default());
        }
    }
    Ok(())
}
