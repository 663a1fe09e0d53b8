//! Self-update and restart plumbing for `/update` and `/restart`.

use std::path::{Path, PathBuf};

use tracing::info;

use botones_exec::{run_checked, RunOptions};

/// Current version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short git commit hash embedded at compile time by build.rs.
pub const GIT_SHA: &str = env!("BOTONES_GIT_SHA");

/// Locate the source checkout by walking up from the running binary.
pub fn find_repo_root() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let mut dir = exe.parent().map(Path::to_path_buf);
    while let Some(d) = dir {
        if d.join(".git").is_dir() {
            return Some(d);
        }
        dir = d.parent().map(Path::to_path_buf);
    }
    None
}

/// Fast-forward the checkout. Returns whatever `git pull` printed, which
/// the caller inspects for "Already up to date".
pub async fn pull_latest(repo_root: &Path) -> botones_exec::Result<String> {
    let repo = repo_root.to_string_lossy().to_string();
    let out = run_checked(
        "git",
        ["-C", repo.as_str(), "pull", "--ff-only"],
        RunOptions::default(),
    )
    .await?;
    Ok(out.stdout.trim().to_string())
}

/// Restart via a detached shell script. The script outlives this process,
/// waits a beat so the interaction reply gets out, then asks systemd to
/// restart the service (falling back to re-executing the binary directly).
pub fn restart_service(service: &str) -> std::io::Result<()> {
    let exe = std::env::current_exe()?;
    let exe_str = exe.to_string_lossy();
    let pid = std::process::id();

    let script = if cfg!(target_os = "linux") {
        format!(
            "#!/bin/sh\nsleep 1\nsystemctl --user restart {service} 2>/dev/null || \\\n  systemctl restart {service} 2>/dev/null || \\\n  \"{exe_str}\" &\nrm -f \"$0\"\n"
        )
    } else {
        format!("#!/bin/sh\nsleep 1\n\"{exe_str}\" &\nrm -f \"$0\"\n")
    };

    let script_path = std::env::temp_dir().join(format!("botones-restart-{pid}.sh"));
    std::fs::write(&script_path, &script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&script_path)?.permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script_path, perms)?;
    }

    std::process::Command::new("sh")
        .arg(&script_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()?;

    info!(%service, "restart script spawned");
    Ok(())
}

/// Print detailed version info and exit.
pub fn print_version() {
    println!("botones {} ({})", VERSION, GIT_SHA);
}
