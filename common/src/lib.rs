// Allow some clippy lints shared with the daemon crate
#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::upper_case_acronyms)]

pub mod config;
pub mod crypto;
pub mod error;
pub mod logger;
pub mod node;
pub mod roles;
pub mod time;
pub mod vesting;

#[cfg(feature = "clap")]
// Shared help output style of the binaries
pub fn get_cli_styles() -> clap::builder::Styles {
    use clap::builder::styling::*;

    let emphasis = |color| Style::new().bold().fg_color(Some(Color::Ansi(color)));
    clap::builder::Styles::styled()
        .usage(emphasis(AnsiColor::Cyan))
        .header(emphasis(AnsiColor::Cyan))
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .valid(emphasis(AnsiColor::Green))
        .invalid(emphasis(AnsiColor::Red))
        .error(emphasis(AnsiColor::Red))
}
