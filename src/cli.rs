//! Interactive session dispatch
//!
//! A [`Session`] owns the binding registry and maps each parsed command to
//! registry, config and gateway calls, collecting the console lines to
//! print. The binary stays a thin line loop around it.

use crate::command::{self, Command, HelpTopic, ParseError};
use crate::config;
use crate::console;
use crate::gateway::GatewayClient;
use crate::registry::BindingRegistry;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One interactive session over a binding registry
pub struct Session<G> {
    registry: BindingRegistry<G>,
    version: String,
    /// Set once `stop` has been handled
    pub should_stop: bool,
}

impl<G: GatewayClient> Session<G> {
    /// Creates a session over a registry
    pub fn new(registry: BindingRegistry<G>, version: &str) -> Self {
        Self {
            registry,
            version: version.to_string(),
            should_stop: false,
        }
    }

    /// Read access to the registry
    pub fn registry(&self) -> &BindingRegistry<G> {
        &self.registry
    }

    /// Opens the bindings from a config file named on the command line
    ///
    /// The path may be wrapped in single quotes. A file that cannot be
    /// loaded leaves the session with an empty registry and a warning.
    pub fn preload(&mut self, raw_path: &str) -> Vec<String> {
        let path = match command::quoted_path(raw_path) {
            Ok(path) => path,
            Err(_) => PathBuf::from(raw_path.trim()),
        };

        match config::load(&path) {
            Ok(binds) => self.registry.open_all(binds).reports,
            Err(e) => {
                debug!("Config preload failed: {}", e);
                vec![console::warning(
                    "Config file could not be read. Did you use single quotes? Proceeding with empty config.",
                )]
            }
        }
    }

    /// Handles one console line and returns the response lines
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        match command::parse_line(line) {
            Ok(command) => self.dispatch(command),
            Err(ParseError::UnknownCommand) => vec![console::warning(
                "Unknown command entered. Please enter \"help\" for command help.",
            )],
            Err(ParseError::Syntax(name)) => vec![console::syntax_error(name)],
            Err(ParseError::MissingPath) => vec![console::error(
                "Could not find specified file/dir. Did you use single quotes?",
            )],
        }
    }

    /// Closes every registered mapping and reports the tally
    ///
    /// Used by `stop` and when input runs out. Entries stay registered, so
    /// the count reflects everything the session was holding.
    pub fn shutdown(&mut self) -> Vec<String> {
        let mut lines = self.registry.close_all();
        lines.push(console::response(&format!(
            "Closed {} open bindings.",
            self.registry.len()
        )));
        lines
    }

    fn dispatch(&mut self, command: Command) -> Vec<String> {
        match command {
            Command::Help(topic) => help_lines(topic),
            Command::Info => self.info_lines(),
            Command::NetworkList => self.network_lines(),
            Command::ConfigAdd(path) => self.config_add(&path),
            Command::ConfigSave(path) => self.config_save(&path),
            Command::PortOpen(protocol, port) => report(self.registry.open(protocol, port)),
            Command::PortClose(protocol, port) => report(self.registry.close(protocol, port)),
            Command::PortCloseIndex(index) => report(self.registry.close_index(index)),
            Command::PortQuery(protocol, port) => report(self.registry.query(protocol, port)),
            Command::PortList => self.binding_lines(),
            Command::Stop => {
                self.should_stop = true;
                self.shutdown()
            }
        }
    }

    fn config_add(&mut self, path: &Path) -> Vec<String> {
        match config::load(path) {
            Ok(binds) => {
                let outcome = self.registry.open_all(binds);
                let mut lines = outcome.reports;
                lines.push(console::response(&format!(
                    "Successfully added ({}) new bindings.",
                    outcome.added
                )));
                lines
            }
            Err(e) => vec![console::error(&e.to_string())],
        }
    }

    fn config_save(&mut self, path: &Path) -> Vec<String> {
        match config::save(self.registry.bindings(), path) {
            Ok(target) => vec![console::response(&format!(
                "Saved config to {}",
                target.display()
            ))],
            Err(e) => vec![console::error(&e.to_string())],
        }
    }

    fn info_lines(&self) -> Vec<String> {
        let mut lines = banner_lines(&self.version);
        lines.push(String::new());
        lines.extend(self.network_lines());
        lines.extend(self.binding_lines());
        lines.push(String::new());
        lines
    }

    fn network_lines(&self) -> Vec<String> {
        let gateway = self.registry.gateway();

        let public = match gateway.external_address() {
            Ok(ip) => ip.to_string(),
            Err(e) => {
                warn!("External address lookup failed: {}", e);
                "unavailable".to_string()
            }
        };

        vec![
            "\t Network Info:".to_string(),
            format!("\t\t Local IP: {}", gateway.local_address()),
            format!("\t\t Public IP: {}", public),
            format!("\t\t Default Gateway: {}", gateway.gateway_address()),
            String::new(),
        ]
    }

    /// Active bindings, numbered from 1 to match `port close index`
    fn binding_lines(&self) -> Vec<String> {
        let mut lines = vec!["\t Active Bindings:".to_string()];
        for (position, binding) in self.registry.bindings().iter().enumerate() {
            lines.push(format!(
                "\t\t {}. {}",
                position + 1,
                binding.describe(self.registry.gateway())
            ));
        }
        lines
    }
}

fn report(result: crate::Result<String>) -> Vec<String> {
    match result {
        Ok(line) => vec![line],
        Err(e) => vec![console::error(&e.to_string())],
    }
}

/// Startup banner, also reused by the `info` command
pub fn banner_lines(version: &str) -> Vec<String> {
    vec![
        console::details(&format!("portbind {} - UPnP port mapping manager", version)),
        console::details("Licensed under MIT or Apache-2.0 - \"help\" for command help."),
    ]
}

/// Goodbye line printed on every exit path
pub fn farewell_line(version: &str) -> String {
    console::response(&format!("Thank you for using portbind {}", version))
}

/// Lines for one help topic
pub fn help_lines(topic: HelpTopic) -> Vec<String> {
    match topic {
        HelpTopic::General => {
            let mut lines = cla_help();
            lines.push(console::details("Commands:"));
            lines.push(
                "\t stop - Gracefully stops the program. All unsaved config data will be lost. All ports will be closed."
                    .to_string(),
            );
            lines.push("\t info - Displays program and network info.".to_string());
            lines.extend(help_help());
            lines.extend(network_help());
            lines.extend(config_help());
            lines.extend(port_help());
            lines
        }
        HelpTopic::Cla => cla_help(),
        HelpTopic::Network => network_help(),
        HelpTopic::Config => config_help(),
        HelpTopic::Port => port_help(),
    }
}

fn cla_help() -> Vec<String> {
    vec![
        console::details("Command-Line Arguments:"),
        "\t <filepath> - Opens saved bindings from a config file. Always surround the path with single quotes, E.g. '/home/you/config.json'.".to_string(),
    ]
}

fn help_help() -> Vec<String> {
    vec![
        "\t help - Shows command info and syntax help.".to_string(),
        "\t\t help cla - Information about setting up Command-Line-Arguments.".to_string(),
    ]
}

fn network_help() -> Vec<String> {
    vec![
        "\t network - Interact with the network.".to_string(),
        "\t\t network list - View network information.".to_string(),
    ]
}

fn config_help() -> Vec<String> {
    vec![
        "\t config - Interact with the config.".to_string(),
        "\t\t config add <filepath> - Adds bindings from a file, to current config. (Use single quotes)".to_string(),
        "\t\t config save <directory> - Saves current config to a directory (Use single quotes), as \"config.json\"".to_string(),
    ]
}

fn port_help() -> Vec<String> {
    vec![
        "\t port - Interact with a port. Acceptable port range is 0-65535.".to_string(),
        "\t\t port open <tcp, udp> <0-65535> - Opens a new port based on params.".to_string(),
        "\t\t port close index <i> - Closes registered port and removes it from config by index. Index starts from 1.".to_string(),
        "\t\t port close <tcp, udp> <0-65535> - Forcefully closes a port, if registered, removes it from current config.".to_string(),
        "\t\t port query <tcp, udp> <0-65535> - Get a port's status. (Open/Closed)".to_string(),
        "\t\t port list - Lists all currently open ports (controlled by portbind).".to_string(),
    ]
}
