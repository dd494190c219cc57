//! Session tests
//!
//! Checks the exact console lines each command produces, since those lines
//! are the program's user interface.

use crate::binding::{Binding, Protocol};
use crate::cli::{banner_lines, farewell_line, help_lines, Session};
use crate::command::HelpTopic;
use crate::config;
use crate::registry::BindingRegistry;
use crate::tests::helpers::FakeGateway;
use tempfile::TempDir;

fn session() -> Session<FakeGateway> {
    Session::new(BindingRegistry::new(FakeGateway::new()), "0.2.0")
}

// === Port commands ===

#[test]
fn test_port_open_reports_success() {
    let mut session = session();

    let lines = session.handle_line("port open tcp 8080");
    assert_eq!(lines, vec!["(i) Successfully opened TCP port: 8080".to_string()]);
    assert_eq!(session.registry().len(), 1);
}

#[test]
fn test_duplicate_open_reports_error_line() {
    let mut session = session();
    session.handle_line("port open tcp 8080");

    let lines = session.handle_line("port open tcp 8080");
    assert_eq!(lines, vec!["(ERROR) Binding already exists.".to_string()]);
    assert_eq!(session.registry().len(), 1);
}

#[test]
fn test_out_of_range_open_reports_error_line() {
    let mut session = session();

    let lines = session.handle_line("port open tcp 70000");
    assert_eq!(
        lines,
        vec!["(ERROR) Invalid port number: 70000. Accepted range: 0-65535.".to_string()]
    );
    assert!(session.registry().is_empty());
}

#[test]
fn test_port_close_index_uses_console_numbering() {
    let mut session = session();
    session.handle_line("port open tcp 8080");
    session.handle_line("port open udp 531");

    let lines = session.handle_line("port close index 1");
    assert_eq!(lines, vec!["(i) Successfully closed TCP port: 8080".to_string()]);
    assert_eq!(session.registry().len(), 1);
    assert_eq!(
        session.registry().bindings()[0],
        Binding::new(Protocol::UDP, 531)
    );
}

#[test]
fn test_port_close_index_out_of_range_line() {
    let mut session = session();
    session.handle_line("port open tcp 8080");

    let lines = session.handle_line("port close index 2");
    assert_eq!(
        lines,
        vec!["(ERROR) Index out of range. Bindings registered: 1.".to_string()]
    );
}

#[test]
fn test_port_close_pair_reports_config_removal() {
    let mut session = session();
    session.handle_line("port open tcp 8080");

    let lines = session.handle_line("port close tcp 8080");
    assert_eq!(
        lines,
        vec!["(i) Successfully closed TCP port: 8080 and removed it from config.".to_string()]
    );
    assert!(session.registry().is_empty());
}

#[test]
fn test_port_query_both_paths() {
    let mut session = session();
    session.handle_line("port open tcp 8080");

    assert_eq!(
        session.handle_line("port query tcp 8080"),
        vec!["(i) Binding registered as TCP: 8080 Open: true".to_string()]
    );
    assert_eq!(
        session.handle_line("port query udp 531"),
        vec!["(i) Binding unregistered. Port open: false".to_string()]
    );
}

#[test]
fn test_port_list_numbers_from_one() {
    let mut session = session();
    session.handle_line("port open tcp 8080");
    session.handle_line("port open udp 531");

    let lines = session.handle_line("port list");
    assert_eq!(
        lines,
        vec![
            "\t Active Bindings:".to_string(),
            "\t\t 1. TCP: 8080 Open: true".to_string(),
            "\t\t 2. UDP: 531 Open: true".to_string(),
        ]
    );
}

#[test]
fn test_port_list_with_empty_registry() {
    let mut session = session();
    let lines = session.handle_line("port list");
    assert_eq!(lines, vec!["\t Active Bindings:".to_string()]);
}

// === Network and info ===

#[test]
fn test_network_list_prints_addresses() {
    let mut session = session();

    let lines = session.handle_line("network list");
    assert_eq!(
        lines,
        vec![
            "\t Network Info:".to_string(),
            "\t\t Local IP: 192.168.1.23".to_string(),
            "\t\t Public IP: 203.0.113.10".to_string(),
            "\t\t Default Gateway: 192.168.1.1".to_string(),
            String::new(),
        ]
    );
}

#[test]
fn test_info_composes_banner_network_and_bindings() {
    let mut session = session();
    session.handle_line("port open tcp 8080");

    let lines = session.handle_line("info");
    assert!(lines[0].contains("portbind 0.2.0"));
    assert!(lines.contains(&"\t Network Info:".to_string()));
    assert!(lines.contains(&"\t Active Bindings:".to_string()));
    assert!(lines.contains(&"\t\t 1. TCP: 8080 Open: true".to_string()));
}

// === Config commands ===

#[test]
fn test_config_save_and_add_round_trip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let mut saver = session();
    saver.handle_line("port open tcp 8080");
    saver.handle_line("port open udp 531");

    let lines = saver.handle_line(&format!("config save '{}'", temp_dir.path().display()));
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("(i) Saved config to "));

    let saved = temp_dir.path().join("config.json");
    let mut loader = session();
    let lines = loader.handle_line(&format!("config add '{}'", saved.display()));

    assert_eq!(
        lines.last().expect("No report lines"),
        "(i) Successfully added (2) new bindings."
    );
    assert_eq!(loader.registry().len(), 2);
    assert!(loader.registry().find(Protocol::TCP, 8080).is_some());
    assert!(loader.registry().find(Protocol::UDP, 531).is_some());
}

#[test]
fn test_config_add_skips_pairs_already_registered() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.json");
    config::save(
        &[
            Binding::new(Protocol::TCP, 8080),
            Binding::new(Protocol::UDP, 531),
        ],
        &path,
    )
    .expect("Failed to save config");

    let mut session = session();
    session.handle_line("port open tcp 8080");

    let lines = session.handle_line(&format!("config add '{}'", path.display()));
    assert_eq!(
        lines.last().expect("No report lines"),
        "(i) Successfully added (1) new bindings."
    );
    assert_eq!(session.registry().len(), 2);
}

#[test]
fn test_config_add_missing_file_reports_error() {
    let mut session = session();

    let lines = session.handle_line("config add '/no/such/file.json'");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("(ERROR) Could not get config data from file: /no/such/file.json"));
    assert!(session.registry().is_empty());
}

#[test]
fn test_config_add_without_quotes_reports_error() {
    let mut session = session();

    let lines = session.handle_line("config add /no/quotes.json");
    assert_eq!(
        lines,
        vec!["(ERROR) Could not find specified file/dir. Did you use single quotes?".to_string()]
    );
}

// === Parse failures ===

#[test]
fn test_unknown_command_warns() {
    let mut session = session();

    let lines = session.handle_line("frobnicate");
    assert_eq!(
        lines,
        vec!["(WARN) Unknown command entered. Please enter \"help\" for command help.".to_string()]
    );
}

#[test]
fn test_syntax_error_names_the_command() {
    let mut session = session();

    let lines = session.handle_line("port open icmp 99");
    assert_eq!(
        lines,
        vec!["(ERROR) [port] Invalid syntax. See \"help\" for command help.".to_string()]
    );
}

// === Stop and preload ===

#[test]
fn test_stop_closes_bindings_and_flags_session() {
    let mut session = session();
    session.handle_line("port open tcp 8080");
    session.handle_line("port open udp 531");

    let lines = session.handle_line("stop");
    assert_eq!(
        lines,
        vec![
            "(i) Successfully closed TCP port: 8080".to_string(),
            "(i) Successfully closed UDP port: 531".to_string(),
            "(i) Closed 2 open bindings.".to_string(),
        ]
    );
    assert!(session.should_stop);
    // Entries stay registered through shutdown
    assert_eq!(session.registry().len(), 2);
}

#[test]
fn test_stop_with_empty_registry() {
    let mut session = session();

    let lines = session.handle_line("stop");
    assert_eq!(lines, vec!["(i) Closed 0 open bindings.".to_string()]);
    assert!(session.should_stop);
}

#[test]
fn test_preload_accepts_quoted_and_bare_paths() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("config.json");
    config::save(&[Binding::new(Protocol::TCP, 8080)], &path).expect("Failed to save config");

    let mut quoted = session();
    quoted.preload(&format!("'{}'", path.display()));
    assert_eq!(quoted.registry().len(), 1);

    let mut bare = session();
    bare.preload(&path.display().to_string());
    assert_eq!(bare.registry().len(), 1);
}

#[test]
fn test_preload_unreadable_file_warns_and_continues() {
    let mut session = session();

    let lines = session.preload("'/no/such/config.json'");
    assert_eq!(
        lines,
        vec![
            "(WARN) Config file could not be read. Did you use single quotes? Proceeding with empty config."
                .to_string()
        ]
    );
    assert!(session.registry().is_empty());
}

// === Fixed text ===

#[test]
fn test_banner_and_farewell_carry_version() {
    let banner = banner_lines("1.2.3");
    assert_eq!(banner.len(), 2);
    assert_eq!(banner[0], "(INFO) portbind 1.2.3 - UPnP port mapping manager");
    assert_eq!(
        banner[1],
        "(INFO) Licensed under MIT or Apache-2.0 - \"help\" for command help."
    );

    assert_eq!(farewell_line("1.2.3"), "(i) Thank you for using portbind 1.2.3");
}

#[test]
fn test_general_help_covers_every_command_family() {
    let text = help_lines(HelpTopic::General).join("\n");
    assert!(text.contains("stop - Gracefully stops the program"));
    assert!(text.contains("info - Displays program and network info."));
    assert!(text.contains("help cla"));
    assert!(text.contains("network list"));
    assert!(text.contains("config add"));
    assert!(text.contains("config save"));
    assert!(text.contains("port open"));
    assert!(text.contains("port close index"));
    assert!(text.contains("port query"));
    assert!(text.contains("port list"));
}

#[test]
fn test_topic_help_is_scoped() {
    let cla = help_lines(HelpTopic::Cla);
    assert_eq!(cla.len(), 2);
    assert!(cla[0].contains("Command-Line Arguments"));

    let network = help_lines(HelpTopic::Network).join("\n");
    assert!(network.contains("network list"));
    assert!(!network.contains("port open"));

    let port = help_lines(HelpTopic::Port).join("\n");
    assert!(port.contains("Acceptable port range is 0-65535."));
    assert!(!port.contains("config save"));
}
