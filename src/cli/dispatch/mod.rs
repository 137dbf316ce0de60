//! Maps validated CLI arguments to the action to run.

use crate::api::parse_base_url;
use crate::cli::actions::{reset::Args, Action};
use crate::cli::commands::{ARG_API_URL, ARG_EMAIL, ARG_REDIRECT_DELAY, ARG_TIMEOUT};
use anyhow::{Context, Result};
use std::time::Duration;

/// Map validated CLI matches to the reset action.
///
/// # Errors
/// Returns an error if required arguments are missing or the API URL is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    parse_base_url(&api_url).context("invalid PASSRESET_API_URL")?;

    let timeout = matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(10);
    let redirect_delay = matches
        .get_one::<u64>(ARG_REDIRECT_DELAY)
        .copied()
        .unwrap_or(2000);

    Ok(Action::Reset(Args {
        api_url,
        timeout: Duration::from_secs(timeout),
        redirect_delay: Duration::from_millis(redirect_delay),
        email: matches.get_one::<String>(ARG_EMAIL).cloned(),
    }))
}
