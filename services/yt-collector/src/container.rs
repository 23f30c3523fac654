//! Container relaunch: run the current command inside a container
//!
//! When `-z/--remote` is passed, the collector re-invokes itself inside
//! the configured image with the same arguments, minus the
//! container-selection flags themselves (forwarding those would trigger
//! another relaunch inside the container).

use anyhow::{Context, Result};
use std::process::ExitStatus;
use tracing::info;

/// Standalone flags stripped before forwarding.
pub const CONTAINER_FLAGS: &[&str] = &["-z", "--remote"];

/// Value-taking options stripped (together with their value) before
/// forwarding.
pub const CONTAINER_OPTS: &[&str] = &["--container-tag", "--container-name"];

/// Remove `flags`, `value_opts` and their values from an argument list.
///
/// Handles three shapes: a bare flag (`-z`), an option followed by its
/// value as the next token (`--container-tag v2`), and the equals form
/// (`--container-tag=v2`). A token after a value option is only treated
/// as its value when it does not itself look like a flag.
pub fn strip_forwarded_args(args: &[String], flags: &[&str], value_opts: &[&str]) -> Vec<String> {
    let mut kept = Vec::new();
    let mut prev_was_value_opt = false;

    for arg in args {
        let consumes_value = prev_was_value_opt && !arg.starts_with('-');
        prev_was_value_opt = false;
        if consumes_value {
            continue;
        }
        if flags.contains(&arg.as_str()) {
            continue;
        }
        if value_opts.contains(&arg.as_str()) {
            prev_was_value_opt = true;
            continue;
        }
        if let Some((name, _value)) = arg.split_once('=')
            && value_opts.contains(&name)
        {
            continue;
        }
        kept.push(arg.clone());
    }

    kept
}

/// Re-invoke the current command inside `image` via `docker run`,
/// forwarding `args` (already stripped). Returns the container's exit
/// status.
pub async fn relaunch(image: &str, name: Option<&str>, args: &[String]) -> Result<ExitStatus> {
    let mut command = tokio::process::Command::new("docker");
    command.arg("run").arg("--rm");
    if let Some(name) = name {
        command.args(["--name", name]);
    }
    command.arg(image).arg("yt-collector").args(args);

    info!(image, args = ?args, "relaunching in container");
    command
        .status()
        .await
        .with_context(|| format!("failed to launch container from image {image}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn strip(list: &[&str]) -> Vec<String> {
        strip_forwarded_args(&args(list), CONTAINER_FLAGS, CONTAINER_OPTS)
    }

    #[test]
    fn bare_flags_are_removed() {
        assert_eq!(strip(&["update", "-z"]), args(&["update"]));
        assert_eq!(strip(&["update", "--remote"]), args(&["update"]));
    }

    #[test]
    fn value_options_and_their_values_are_removed() {
        assert_eq!(
            strip(&["update", "--container-tag", "v2", "--container-name", "run-1"]),
            args(&["update"])
        );
    }

    #[test]
    fn equals_form_is_removed() {
        assert_eq!(
            strip(&["update", "--container-tag=v2", "-z"]),
            args(&["update"])
        );
    }

    #[test]
    fn value_resembling_a_flag_is_not_consumed() {
        // A flag right after a value option is not its value
        assert_eq!(
            strip(&["update", "--container-tag", "--config", "my.toml"]),
            args(&["update", "--config", "my.toml"])
        );
    }

    #[test]
    fn unrelated_args_pass_through() {
        assert_eq!(
            strip(&["update", "--config", "my.toml", "-z", "--container-tag", "v2"]),
            args(&["update", "--config", "my.toml"])
        );
    }

    #[test]
    fn empty_list_stays_empty() {
        assert!(strip(&[]).is_empty());
    }

    #[test]
    fn equals_form_of_unrelated_option_is_kept() {
        assert_eq!(
            strip(&["update", "--config=my.toml"]),
            args(&["update", "--config=my.toml"])
        );
    }
}
