//! Host-facing commands: `/ping`, `/whois`, `/speedtest`, `/sysinfo`,
//! `/update`, `/restart`.

use std::sync::Arc;

use serenity::model::application::CommandInteraction;
use serenity::prelude::Context;

use botones_exec::{probe, run, run_checked, RunOptions};

use crate::context::BotContext;
use crate::reply::{defer, edit_chunked, opt_str, respond_ephemeral};
use crate::update;

/// Hostnames and IPs only; anything else never reaches the command line.
fn valid_host(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == ':')
}

pub async fn handle_ping(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let host = opt_str(command, "host").unwrap_or("").trim().to_string();
    if !valid_host(&host) {
        respond_ephemeral(ctx, command, "That does not look like a hostname or IP.").await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let report = match run(
        "ping",
        ["-c", "4", "-W", "5", host.as_str()],
        RunOptions::default(),
    )
    .await
    {
        Ok(out) => {
            let body = if out.stdout.trim().is_empty() {
                out.stderr
            } else {
                out.stdout
            };
            format!("```\n{}\n```", body.trim())
        }
        Err(e) => format!("\u{26a0}\u{fe0f} ping failed: {e}"),
    };

    edit_chunked(ctx, command, &report).await
}

pub async fn handle_whois(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let domain = opt_str(command, "domain").unwrap_or("").trim().to_string();
    if !valid_host(&domain) {
        respond_ephemeral(ctx, command, "That does not look like a domain.").await;
        return Ok(());
    }
    if let Err(e) = probe("whois") {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let report = match run_checked("whois", [domain.as_str()], RunOptions::default()).await {
        Ok(out) => format!("```\n{}\n```", out.stdout.trim()),
        Err(e) => format!("\u{26a0}\u{fe0f} whois failed: {e}"),
    };

    edit_chunked(ctx, command, &report).await
}

pub async fn handle_speedtest(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    if let Err(e) = probe("speedtest-cli") {
        respond_ephemeral(ctx, command, &e.to_string()).await;
        return Ok(());
    }

    defer(ctx, command, false).await?;

    let options = RunOptions {
        timeout_secs: 120,
        ..RunOptions::default()
    };
    let report = match run_checked("speedtest-cli", ["--simple"], options).await {
        Ok(out) => format!("```\n{}\n```", out.stdout.trim()),
        Err(e) => format!("\u{26a0}\u{fe0f} speed test failed: {e}"),
    };

    edit_chunked(ctx, command, &report).await
}

pub async fn handle_sysinfo(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    defer(ctx, command, false).await?;

    let probes: [(&str, Vec<&str>); 4] = [
        ("uname", vec!["-a"]),
        ("uptime", vec![]),
        ("free", vec!["-h"]),
        ("df", vec!["-h", "/"]),
    ];

    let mut sections = Vec::new();
    for (program, args) in probes {
        match run(program, args, RunOptions::default()).await {
            Ok(out) if out.success() => sections.push(out.stdout.trim().to_string()),
            Ok(out) => sections.push(format!("{program}: exit {}", out.exit_code)),
            Err(e) => sections.push(format!("{program}: {e}")),
        }
    }

    let report = format!("```\n{}\n```", sections.join("\n\n"));
    edit_chunked(ctx, command, &report).await
}

pub async fn handle_update(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    let Some(repo_root) = update::find_repo_root() else {
        respond_ephemeral(
            ctx,
            command,
            "This install does not run from a git checkout; nothing to update.",
        )
        .await;
        return Ok(());
    };

    defer(ctx, command, true).await?;

    let text = match update::pull_latest(&repo_root).await {
        Ok(output) if output.contains("Already up to date") => {
            format!("Already up to date ({}).", update::GIT_SHA)
        }
        Ok(output) => match update::restart_service(&app.config.service.name) {
            Ok(()) => format!("Updated, restarting now.\n```\n{output}\n```"),
            Err(e) => format!(
                "Updated, but the restart failed ({e}). Restart the service manually.\n```\n{output}\n```"
            ),
        },
        Err(e) => format!("\u{26a0}\u{fe0f} update failed: {e}"),
    };

    edit_chunked(ctx, command, &text).await
}

pub async fn handle_restart(
    app: &Arc<BotContext>,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), serenity::Error> {
    defer(ctx, command, true).await?;

    let service = &app.config.service.name;
    let text = match update::restart_service(service) {
        Ok(()) => format!("Restarting `{service}`."),
        Err(e) => format!("\u{26a0}\u{fe0f} restart failed: {e}"),
    };

    edit_chunked(ctx, command, &text).await
}
