use crate::core::config::{CheckConfig, ConfigOverrides, FileConfig};
use crate::core::counter_client::{AgentClient, CounterRequest, CounterSource};
use crate::core::evaluator::CheckRun;
use crate::core::severity::Severity;
use crate::core::threshold::Thresholds;
use crate::core::validation;
use crate::error::CheckError;
use crate::ui::formatters;
use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Command line definition of the plugin
pub fn build_cli() -> Command {
    Command::new("agent-check")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check a monitoring agent performance counter against warning/critical ranges")
        .after_help(
            "Ranges use the monitoring-plugins syntax: 10, 10:, ~:10, 10:20, @10:20\n\
             Exit codes: 0 OK, 1 WARNING, 2 CRITICAL, 3 UNKNOWN",
        )
        .arg(
            Arg::new("host")
                .short('H')
                .long("host")
                .value_name("HOST")
                .help("Agent hostname or ip"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Agent port number (default: 9000)")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("username")
                .short('u')
                .long("username")
                .value_name("USER")
                .env("MONITORING_AGENT_USERNAME")
                .help("Basic auth username"),
        )
        .arg(
            Arg::new("password")
                .short('P')
                .long("password")
                .value_name("PASS")
                .env("MONITORING_AGENT_PASSWORD")
                .hide_env_values(true)
                .help("Basic auth password"),
        )
        .arg(
            Arg::new("counter")
                .short('C')
                .long("counter")
                .value_name("PATH")
                .help("Counter path (i.e. \\PhysicalDisk(_Total)\\Avg. Disk Queue Length)"),
        )
        .arg(
            Arg::new("warning")
                .short('w')
                .long("warning")
                .value_name("RANGE")
                .allow_hyphen_values(true)
                .help("Warning threshold range"),
        )
        .arg(
            Arg::new("critical")
                .short('c')
                .long("critical")
                .value_name("RANGE")
                .allow_hyphen_values(true)
                .help("Critical threshold range"),
        )
        .arg(
            Arg::new("unit")
                .long("unit")
                .value_name("UOM")
                .help("Unit of measurement for performance data (default: %)"),
        )
        .arg(
            Arg::new("cacert")
                .long("cacert")
                .value_name("FILE")
                .env("MONITORING_AGENT_CA_CERTIFICATE_PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("CA certificate bundle (PEM)"),
        )
        .arg(
            Arg::new("certificate")
                .long("certificate")
                .value_name("FILE")
                .env("MONITORING_AGENT_CLIENT_CERTIFICATE_PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Client certificate file (PEM)"),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .value_name("FILE")
                .env("MONITORING_AGENT_CLIENT_KEY_PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Client private key file (PEM: PKCS#1, PKCS#8 or SEC1)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("DURATION")
                .help("Overall timeout (e.g. 10s, 500ms, 1m30s; default: 10s)"),
        )
        .arg(
            Arg::new("insecure")
                .long("insecure")
                .help("Ignore TLS certificate checks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .env("AGENT_CHECK_CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .help("JSON file with default connection settings"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more details to stderr (repeat for debug)")
                .action(ArgAction::Count),
        )
}

/// Map a clap parse failure to the plugin result line and exit code.
///
/// Returns `None` for `--help` and `--version`, which keep clap's own output.
pub fn usage_error(err: &clap::Error) -> Option<(String, i32)> {
    if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return None;
    }

    // Usage errors are UNKNOWN for the scheduler, not clap's exit code 2
    let rendered = err.to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ");
    Some((
        format!("{}: {}", Severity::Unknown, message),
        Severity::Unknown.exit_code(),
    ))
}

/// Collect the command line values into config overrides
pub fn overrides_from(matches: &ArgMatches) -> ConfigOverrides {
    let string = |id: &str| matches.get_one::<String>(id).cloned();
    let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();

    ConfigOverrides {
        host: string("host"),
        port: matches.get_one::<u16>("port").copied(),
        username: string("username"),
        password: string("password"),
        counter: string("counter"),
        warning: string("warning"),
        critical: string("critical"),
        unit: string("unit"),
        cacert: path("cacert"),
        certificate: path("certificate"),
        key: path("key"),
        timeout: string("timeout"),
        insecure: matches.get_flag("insecure"),
    }
}

/// Run the check described by the command line, print the result line and
/// return the exit code for the process.
pub fn execute(matches: &ArgMatches) -> Result<i32> {
    let prepared = prepare(matches).and_then(|(config, client)| {
        let deadline = deadline_after(config.timeout)?;
        Ok((config, client, deadline))
    });

    let run = match prepared {
        Ok((config, client, deadline)) => run_check(&config, &client, deadline),
        Err(e) => {
            let mut run = CheckRun::new();
            run.abort(format!("{:#}", e));
            run
        }
    };

    let (line, code) = formatters::render(&run);
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;

    Ok(code)
}

/// Deadline for a run starting now
pub fn deadline_after(timeout: Duration) -> crate::error::Result<Instant> {
    Instant::now().checked_add(timeout).ok_or_else(|| {
        CheckError::config(format!("timeout {:?} is out of range", timeout))
    })
}

fn prepare(matches: &ArgMatches) -> Result<(CheckConfig, AgentClient)> {
    let file = FileConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    let config = CheckConfig::resolve(file, overrides_from(matches))?;
    let url = validation::counter_url(&config.host, config.port)?;

    let client = AgentClient::new(
        url,
        config.username.clone(),
        config.password.clone(),
        config.tls.clone(),
    );

    Ok((config, client))
}

/// Fetch the configured counter from `source` and evaluate every returned
/// instance. Collection must finish before `deadline`; otherwise the run is
/// aborted as UNKNOWN and nothing is evaluated.
pub fn run_check(config: &CheckConfig, source: &dyn CounterSource, deadline: Instant) -> CheckRun {
    let mut run = CheckRun::new();

    let thresholds =
        match Thresholds::parse(config.warning.as_deref(), config.critical.as_deref()) {
            Ok(thresholds) => thresholds,
            Err(e) => {
                run.abort(e.to_string());
                return run;
            }
        };
    log::debug!(
        "Thresholds: warning={:?} critical={:?}",
        thresholds.warning(),
        thresholds.critical()
    );

    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        run.abort(CheckError::timeout(config.timeout).to_string());
        return run;
    }

    let request = CounterRequest {
        counter_path: config.counter.clone(),
    };

    let results = match source.fetch(&request, remaining) {
        Ok(results) => results,
        Err(e) => {
            log::warn!("Counter collection failed: {}", e);
            let e = match e {
                CheckError::Timeout(_) => CheckError::timeout(config.timeout),
                other => other,
            };
            run.abort(e.to_string());
            return run;
        }
    };

    if Instant::now() > deadline {
        log::warn!("Counter arrived after the deadline");
        run.abort(CheckError::timeout(config.timeout).to_string());
        return run;
    }

    if results.is_empty() {
        run.set_summary(format!("{}: no counter instances returned", counter_name(config)));
        return run;
    }

    for item in &results {
        run.evaluate(item.label(), &item.value, &config.unit, &thresholds);
    }

    run.set_summary(format!(
        "{} ({} instance{})",
        counter_name(config),
        results.len(),
        if results.len() == 1 { "" } else { "s" }
    ));

    run
}

fn counter_name(config: &CheckConfig) -> &str {
    if config.counter.is_empty() {
        "counter"
    } else {
        &config.counter
    }
}
