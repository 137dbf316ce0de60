//! Interactive terminal session for the reset wizard. Prompts stand in for the
//! form fields and the terminal navigator stands in for the router: the
//! session ends as soon as the wizard asks to leave for another route.
//! Passwords are read through [`PasswordInput`] so they never echo.

use crate::{
    api::{ResetApi, ResetClient},
    reset::{Navigation, NavigationContext, Navigator, Route, Step, Wizard},
};
use anyhow::{bail, Context, Result};
use inquire::{Password, PasswordDisplayMode};
use secrecy::{ExposeSecret, SecretString};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines},
    sync::mpsc,
};
use tracing::{debug, warn};

/// Typed at any prompt to go back one step.
pub const BACK: &str = ":back";
/// Typed at the code prompt to request a new code.
pub const RESEND: &str = ":resend";

#[derive(Debug, Clone)]
pub struct Args {
    pub api_url: String,
    pub timeout: Duration,
    pub redirect_delay: Duration,
    pub email: Option<String>,
}

/// Forwards route changes to the session loop.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    tx: mpsc::UnboundedSender<Navigation>,
}

impl TerminalNavigator {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Navigation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route, context: NavigationContext) {
        if self.tx.send(Navigation { route, context }).is_err() {
            warn!(%route, "navigation dropped: session already closed");
        }
    }
}

/// Source of the password fields.
pub trait PasswordInput {
    /// Read one password for the field labelled `label`.
    fn read_password(&mut self, label: &str) -> impl Future<Output = Result<SecretString>> + Send;
}

/// Reads passwords from the terminal with echo disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct HiddenPasswords;

impl PasswordInput for HiddenPasswords {
    async fn read_password(&mut self, label: &str) -> Result<SecretString> {
        let label = label.to_string();

        let password = tokio::task::spawn_blocking(move || {
            Password::new(&label)
                .with_display_mode(PasswordDisplayMode::Hidden)
                .without_confirmation()
                .prompt()
        })
        .await
        .context("password prompt task failed")?
        .context("failed to read password")?;

        Ok(SecretString::from(password))
    }
}

/// Handle the reset action
///
/// # Errors
/// Returns an error if the client cannot be built or stdin/stdout fail.
pub async fn handle(args: Args) -> Result<()> {
    let client = ResetClient::new(&args.api_url, args.timeout)
        .context("failed to build API client")?;
    let (navigator, routes) = TerminalNavigator::channel();
    let mut wizard = Wizard::with_redirect_delay(client, Arc::new(navigator), args.redirect_delay);

    if let Some(email) = args.email {
        wizard.set_email(email);
    }

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    let navigation = run_session(
        &mut wizard,
        routes,
        input,
        &mut HiddenPasswords,
        &mut output,
    )
    .await?;
    write_navigation(&mut output, &navigation).await?;

    Ok(())
}

/// Drives the wizard from line-based input until it navigates away. Email and
/// code come from `input`, passwords from `passwords`.
///
/// # Errors
/// Returns an error if the input ends before the wizard navigates, a password
/// cannot be read, or writing to `output` fails.
pub async fn run_session<A, R, P, W>(
    wizard: &mut Wizard<A, TerminalNavigator>,
    mut routes: mpsc::UnboundedReceiver<Navigation>,
    input: R,
    passwords: &mut P,
    output: &mut W,
) -> Result<Navigation>
where
    A: ResetApi,
    R: AsyncBufRead + Unpin,
    P: PasswordInput,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        if let Ok(navigation) = routes.try_recv() {
            return Ok(navigation);
        }

        debug!(step = %wizard.step(), "prompting");

        match wizard.step() {
            Step::Request => {
                let current = wizard.state().email().to_string();
                let prompt = if current.is_empty() {
                    "Email: ".to_string()
                } else {
                    format!("Email [{current}]: ")
                };

                let line = prompt_line(&mut lines, output, &prompt).await?;
                match line.trim() {
                    BACK => wizard.back().await,
                    "" => wizard.submit().await,
                    email => {
                        wizard.set_email(email);
                        wizard.submit().await;
                    }
                }
            }
            Step::Verify => {
                let line = prompt_line(
                    &mut lines,
                    output,
                    &format!("Verification code ({RESEND}, {BACK}): "),
                )
                .await?;
                match line.trim() {
                    BACK => wizard.back().await,
                    RESEND => wizard.resend().await,
                    code => {
                        wizard.set_otp_code(code);
                        wizard.submit().await;
                    }
                }
            }
            Step::Reset => {
                let new_password = passwords
                    .read_password(&format!("New password ({BACK}):"))
                    .await?;
                if new_password.expose_secret().trim() == BACK {
                    wizard.back().await;
                } else {
                    let confirm_password = passwords.read_password("Confirm password:").await?;
                    wizard.set_new_password(new_password);
                    wizard.set_confirm_password(confirm_password);
                    wizard.submit().await;
                }
            }
            Step::Complete => {
                return routes
                    .recv()
                    .await
                    .context("navigator closed before the login redirect");
            }
        }

        if let Some(status) = wizard.status() {
            output.write_all(format!("{status}\n").as_bytes()).await?;
            output.flush().await?;
        }
    }
}

async fn prompt_line<R, W>(lines: &mut Lines<R>, output: &mut W, prompt: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(prompt.as_bytes()).await?;
    output.flush().await?;

    match lines.next_line().await? {
        Some(line) => Ok(line),
        None => bail!("input closed before the password reset finished"),
    }
}

async fn write_navigation<W: AsyncWrite + Unpin>(
    output: &mut W,
    navigation: &Navigation,
) -> Result<()> {
    let mut text = format!("-> {}", navigation.route);
    if let Some(email) = &navigation.context.email {
        text.push_str(&format!(" (email: {email})"));
    }
    text.push('\n');
    if let Some(message) = &navigation.context.message {
        text.push_str(message);
        text.push('\n');
    }

    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
