//! Grant tracker CLI.
//!
//! # Responsibility
//! - Load config, start logging and open the store once per invocation.
//! - Gate every data command behind a successful login.
//! - Render results as text or JSON; all rules live in `grants_core`.

mod cli;
mod commands;

use clap::Parser;
use grants_core::{AttachmentError, AuthError, GrantServiceError};

fn main() {
    let cli = cli::Cli::parse();
    if let Err(err) = commands::run(cli) {
        eprintln!("grants error: {}", user_message(&err));
        std::process::exit(1);
    }
}

/// Inline message for input problems, generic message for storage failures.
fn user_message(err: &anyhow::Error) -> String {
    let classified = if let Some(err) = err.downcast_ref::<GrantServiceError>() {
        Some((err.kind(), err.to_string()))
    } else if let Some(err) = err.downcast_ref::<AuthError>() {
        Some((err.kind(), err.to_string()))
    } else {
        err.downcast_ref::<AttachmentError>()
            .map(|err| (err.kind(), err.to_string()))
    };

    match classified {
        Some((kind, message)) if kind.is_user_facing() => message,
        Some(_) => {
            log::error!("event=cli_command module=cli status=error error={err:#}");
            "the operation failed because of a storage error".to_string()
        }
        None => format!("{err:#}"),
    }
}
