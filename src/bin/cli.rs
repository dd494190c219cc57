//! Portbind command line interface
//!
//! Discovers the UPnP gateway once at startup, optionally preloads a
//! config named on the command line, then reads commands from stdin until
//! `stop` or end of input. The process exits 0 on every path; failures are
//! reported lines, not exit codes.

use clap::Parser;
use portbind::cli::{banner_lines, farewell_line, Session};
use portbind::console;
use portbind::gateway::{UpnpGateway, DISCOVERY_TIMEOUT};
use portbind::registry::BindingRegistry;
use std::io::{self, Write};

#[derive(Debug, Parser)]
#[command(name = "portbind", version, about = "UPnP port mapping manager")]
struct Cli {
    /// Config file with bindings to open on startup (surround the path with single quotes)
    config: Option<String>,
}

fn main() {
    portbind::init();
    let cli = Cli::parse();
    let version = env!("CARGO_PKG_VERSION");

    for line in banner_lines(version) {
        println!("{}", line);
    }

    // Discovery doubles as the availability check. Without a gateway no
    // command can do anything useful, so this is the one fatal condition.
    let gateway = match UpnpGateway::discover(DISCOVERY_TIMEOUT) {
        Ok(gateway) => gateway,
        Err(_) => {
            println!(
                "{}",
                console::error(
                    "UPnP service is not available on this network. You will have to port forward using conventional means through your router."
                )
            );
            println!("{}", farewell_line(version));
            return;
        }
    };

    let mut session = Session::new(BindingRegistry::new(gateway), version);

    if let Some(raw_path) = cli.config.as_deref() {
        for line in session.preload(raw_path) {
            println!("{}", line);
        }
    }

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("{}", console::PROMPT);
        let _ = io::stdout().flush();

        input.clear();
        let read = match stdin.read_line(&mut input) {
            Ok(read) => read,
            Err(e) => {
                eprintln!("{}", console::error(&format!("Failed to read input: {}", e)));
                0
            }
        };

        // End of input closes the session like `stop`
        if read == 0 {
            println!();
            for line in session.shutdown() {
                println!("{}", line);
            }
            break;
        }

        for line in session.handle_line(&input) {
            println!("{}", line);
        }
        if session.should_stop {
            break;
        }
    }

    println!("{}", farewell_line(version));
}
