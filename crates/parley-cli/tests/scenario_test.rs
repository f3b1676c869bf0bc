//! End-to-end scenario runs through the text driver.

use parley_app::{LocalUser, SessionConfig, UnreadPolicy};
use parley_cli::{RunOptions, Runner, parse_script};

fn run(script: &str, config: SessionConfig) -> String {
    let options = RunOptions { user: LocalUser::new("me", "Me"), config };
    let mut runner = Runner::start(options, Vec::new()).unwrap();
    runner.run(&parse_script(script).unwrap()).unwrap();
    String::from_utf8(runner.finish()).unwrap()
}

#[test]
fn demo_script_output() {
    let output = run(include_str!("../scripts/demo.parley"), SessionConfig::default());
    let lines: Vec<_> = output.lines().collect();

    assert_eq!(&lines[..9], [
        "-> #General",
        "-> #General",
        "-> #Off-topic",
        "   #General has 1 unread",
        "   #General has 2 unread",
        "   @Bob is online",
        "-> @Bob (direct)",
        "!  name must not be empty",
        "   uploaded avatar.png (image/png)",
    ]);
    assert_eq!(lines[9], "!  file type of notes.txt (text/plain) is not allowed");

    assert_eq!(&lines[10..], [
        "Me  [Change Avatar] [Sign Out]",
        "STARRED (1)",
        "  #General",
        "CHANNELS (3)",
        "  #General (2)",
        "  #Off-topic",
        "  #design",
        "DIRECT MESSAGES (2)",
        "> @Bob (online)",
        "  @Carol (offline)",
    ]);
}

#[test]
fn accumulate_policy_from_config() {
    let config = SessionConfig { unread_policy: UnreadPolicy::Accumulate, ..SessionConfig::default() };
    let output = run("channel a A\nchannel b B\nmessage b 3\nshow", config);

    assert!(output.contains("  #B (3)"));
}

#[test]
fn errors_do_not_stop_the_run() {
    let output = run("select nowhere\ndm nobody\nchannel a A\nshow", SessionConfig::default());

    assert!(output.contains("!  unknown channel nowhere"));
    assert!(output.contains("!  unknown peer nobody"));
    assert!(output.contains("> #A"));
}

#[test]
fn sign_out_ends_the_session() {
    let output = run("channel a A\nsignout\nselect a", SessionConfig::default());

    assert!(output.contains("   signed out"));
    assert!(output.ends_with("!  session has been torn down\n"));
}
