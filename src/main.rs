use agent_check::commands::check::{build_cli, usage_error};
use agent_check::Severity;
use std::process;

fn main() {
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => match usage_error(&e) {
            Some((line, code)) => {
                println!("{}", line);
                process::exit(code);
            }
            None => e.exit(),
        },
    };

    agent_check::init_logging(matches.get_count("verbose"));

    let code = match agent_check::commands::check(&matches) {
        Ok(code) => code,
        Err(e) => {
            println!("{}: {:#}", Severity::Unknown, e);
            Severity::Unknown.exit_code()
        }
    };

    process::exit(code);
}
