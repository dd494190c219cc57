//! Command parsing for the interactive console
//!
//! Turns one input line into a typed [`Command`]. Registry logic never
//! re-reads text, and every malformed line comes back as a recoverable
//! [`ParseError`] instead of ending the session.

use crate::binding::Protocol;
use std::path::PathBuf;
use std::str::FromStr;

/// Help topics addressable from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    /// The full command tree
    General,
    /// Command-line argument usage
    Cla,
    /// The network command family
    Network,
    /// The config command family
    Config,
    /// The port command family
    Port,
}

/// One parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `help`, `?`, `help cla`, or a bare command family name
    Help(HelpTopic),
    /// `info`
    Info,
    /// `network list`
    NetworkList,
    /// `config add '<path>'`
    ConfigAdd(PathBuf),
    /// `config save '<path>'`
    ConfigSave(PathBuf),
    /// `port open {tcp|udp} <port>`
    PortOpen(Protocol, u32),
    /// `port close {tcp|udp} <port>`
    PortClose(Protocol, u32),
    /// `port close index <n>`, already translated to zero-based
    PortCloseIndex(usize),
    /// `port query {tcp|udp} <port>`
    PortQuery(Protocol, u32),
    /// `port list`
    PortList,
    /// `stop`
    Stop,
}

/// A line that could not be parsed into a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The first word is not a known command
    UnknownCommand,
    /// A known command with malformed arguments. Carries the command name.
    Syntax(&'static str),
    /// `config add` or `config save` without a quoted path
    MissingPath,
}

/// Parses one console line
pub fn parse_line(line: &str) -> Result<Command, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first().copied() {
        Some("help") | Some("?") => parse_help(&tokens),
        Some("info") => Ok(Command::Info),
        Some("network") => parse_network(&tokens),
        Some("config") => parse_config(&tokens, line),
        Some("port") => parse_port(&tokens),
        Some("stop") => Ok(Command::Stop),
        _ => Err(ParseError::UnknownCommand),
    }
}

/// Extracts the path between the first pair of single quotes
///
/// Quoting makes paths with spaces unambiguous, so it is required even
/// when the path has none.
pub fn quoted_path(line: &str) -> Result<PathBuf, ParseError> {
    let start = line.find('\'').ok_or(ParseError::MissingPath)?;
    let rest = &line[start + 1..];
    let end = rest.find('\'').ok_or(ParseError::MissingPath)?;

    let path = &rest[..end];
    if path.is_empty() {
        return Err(ParseError::MissingPath);
    }
    Ok(PathBuf::from(path))
}

fn parse_help(tokens: &[&str]) -> Result<Command, ParseError> {
    match tokens.get(1) {
        None => Ok(Command::Help(HelpTopic::General)),
        Some(&"cla") => Ok(Command::Help(HelpTopic::Cla)),
        Some(_) => Err(ParseError::Syntax("help")),
    }
}

fn parse_network(tokens: &[&str]) -> Result<Command, ParseError> {
    match tokens.get(1) {
        None => Ok(Command::Help(HelpTopic::Network)),
        Some(&"list") => Ok(Command::NetworkList),
        Some(_) => Err(ParseError::Syntax("network")),
    }
}

fn parse_config(tokens: &[&str], line: &str) -> Result<Command, ParseError> {
    match tokens.get(1) {
        None => Ok(Command::Help(HelpTopic::Config)),
        Some(&"add") => Ok(Command::ConfigAdd(quoted_path(line)?)),
        Some(&"save") => Ok(Command::ConfigSave(quoted_path(line)?)),
        Some(_) => Err(ParseError::Syntax("config")),
    }
}

fn parse_port(tokens: &[&str]) -> Result<Command, ParseError> {
    match tokens.get(1) {
        None => Ok(Command::Help(HelpTopic::Port)),
        Some(&"open") => {
            let (protocol, port) = pair_args(tokens)?;
            Ok(Command::PortOpen(protocol, port))
        }
        Some(&"close") => parse_port_close(tokens),
        Some(&"query") => {
            let (protocol, port) = pair_args(tokens)?;
            Ok(Command::PortQuery(protocol, port))
        }
        Some(&"list") => Ok(Command::PortList),
        Some(_) => Err(ParseError::Syntax("port")),
    }
}

fn parse_port_close(tokens: &[&str]) -> Result<Command, ParseError> {
    if tokens.get(2) == Some(&"index") {
        // Positions are 1-based on the console
        let position: usize = tokens
            .get(3)
            .and_then(|raw| raw.parse().ok())
            .ok_or(ParseError::Syntax("port"))?;
        if position == 0 {
            return Err(ParseError::Syntax("port"));
        }
        return Ok(Command::PortCloseIndex(position - 1));
    }

    let (protocol, port) = pair_args(tokens)?;
    Ok(Command::PortClose(protocol, port))
}

/// Parses the `{tcp|udp} <port>` argument pair at positions 2 and 3
fn pair_args(tokens: &[&str]) -> Result<(Protocol, u32), ParseError> {
    let protocol = tokens
        .get(2)
        .and_then(|raw| Protocol::from_str(raw).ok())
        .ok_or(ParseError::Syntax("port"))?;

    let port = tokens
        .get(3)
        .and_then(|raw| raw.parse().ok())
        .ok_or(ParseError::Syntax("port"))?;

    Ok((protocol, port))
}
