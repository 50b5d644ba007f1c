//! Status command.

use anyhow::Result;
use gateway_lifecycle::ServiceStatus;
use serde::Serialize;
use std::time::Duration;

use crate::output::{self, OutputFormat};
use crate::service::{self, ServiceContext};

/// Status output for JSON.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refcount: Option<u32>,
    pub stop_requested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,
}

/// Execute the status command.
pub async fn execute(context: &ServiceContext, format: OutputFormat) -> Result<()> {
    let status = context.coordinator()?.status()?;

    let mut out = StatusOutput {
        running: false,
        pid: None,
        refcount: None,
        stop_requested: false,
        url: None,
        healthy: None,
    };

    if let ServiceStatus::Running {
        pid,
        refcount,
        stop_requested,
    } = status
    {
        out.running = true;
        out.pid = Some(pid);
        out.refcount = Some(refcount);
        out.stop_requested = stop_requested;

        // The document may have been edited since the service started
        if let Ok(config) = context.load_config().await {
            let url = config.service_url();
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(2))
                .build()?;
            out.healthy = Some(service::is_healthy(&client, &url).await);
            out.url = Some(url);
        }
    }

    if format == OutputFormat::Json {
        return output::json(&out);
    }

    output::section("Relay service");
    output::status(if out.running { "running" } else { "not running" }, out.running);
    if let (Some(pid), Some(refcount)) = (out.pid, out.refcount) {
        output::key_value("PID", &pid.to_string());
        output::key_value("Clients", &refcount.to_string());
    }
    if out.stop_requested {
        output::key_value("Pending", "stop once clients exit");
    }
    if let Some(url) = &out.url {
        output::key_value("URL", url);
    }
    if let Some(healthy) = out.healthy {
        output::status(if healthy { "healthy" } else { "not answering" }, healthy);
    }
    output::key_value("Home", &context.home.root().display().to_string());
    Ok(())
}
