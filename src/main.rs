mod debug_report;
mod logger;

use mailpiece::{
    AccountType, Interpreted, Options, Package, Service, UnitSystem, UnmatchedSentence, parse_constraints_verbose,
    parse_event, parse_response,
};
use std::io::{self, IsTerminal, Read};

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    logger::init_cli_logger(config.verbose);

    let code = match config.mode {
        Mode::Sentence(sentence) => {
            let trace = parse_constraints_verbose(&sentence);
            debug_report::print_constraints(&sentence, &trace, config.color);
            if trace.result.is_ok() { 0 } else { 1 }
        }
        Mode::Event(line) => {
            let event = parse_event(&line);
            debug_report::print_event(&line, event.as_ref(), config.color);
            if event.is_some() { 0 } else { 1 }
        }
        Mode::Response(body) => {
            match parse_response(&body, &config.packages, &config.tracking_number, &config.options) {
                Ok(Interpreted::Rates(rates)) => {
                    debug_report::print_rates(&rates, &config.packages, config.options.account_type, config.color);
                    0
                }
                Ok(Interpreted::Tracking(response)) => {
                    debug_report::print_tracking(&response, config.color);
                    0
                }
                Err(err) => {
                    debug_report::print_error(&err, config.verbose, config.color);
                    1
                }
            }
        }
    };

    std::process::exit(code);
}

enum Mode {
    Sentence(String),
    Event(String),
    Response(Vec<u8>),
}

struct CliConfig {
    mode: Mode,
    packages: Vec<Package>,
    tracking_number: String,
    options: Options,
    verbose: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut mode: Option<Mode> = None;
    let mut input_path: Option<String> = None;
    let mut package_args: Vec<String> = Vec::new();
    let mut units = UnitSystem::Imperial;
    let mut tracking_number = String::new();
    let mut options = Options::default();
    let mut mail_type: Option<String> = None;
    let mut verbose = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String, String> {
        args.next().ok_or_else(|| format!("error: {flag} expects a value"))
    }

    fn set_mode(mode: &mut Option<Mode>, next: Mode) -> Result<(), String> {
        if mode.is_some() {
            return Err("error: choose one of --sentence, --event or a response body".to_string());
        }
        *mode = Some(next);
        Ok(())
    }

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, inline)) if flag.starts_with("--") => (flag.to_string(), Some(inline.to_string())),
            _ => (arg.clone(), None),
        };
        let mut take = |flag: &str| match inline.clone() {
            Some(v) => Ok(v),
            None => value(&mut args, flag),
        };

        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("mailpiece {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "-v" | "--verbose" => verbose = true,
            "--lenient" => options.unmatched_sentence = UnmatchedSentence::Unconstrained,
            "--metric" => units = UnitSystem::Metric,
            "--sentence" | "-s" => set_mode(&mut mode, Mode::Sentence(take("--sentence")?))?,
            "--event" | "-e" => set_mode(&mut mode, Mode::Event(take("--event")?))?,
            "--input" | "-i" => {
                if input_path.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input_path = Some(take("--input")?);
            }
            "--package" | "-p" => package_args.push(take("--package")?),
            "--tracking-number" | "-t" => tracking_number = take("--tracking-number")?,
            "--account" => {
                let raw = take("--account")?;
                options.account_type = AccountType::parse(&raw)
                    .ok_or_else(|| format!("error: invalid --account '{raw}' (retail, commercial_base, commercial_plus)"))?;
            }
            "--service" => {
                let raw = take("--service")?;
                options.service =
                    Some(Service::from_code(&raw).ok_or_else(|| format!("error: unknown --service '{raw}'"))?);
            }
            "--mail-type" => mail_type = Some(take("--mail-type")?),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                return Err(format!("error: unexpected argument '{arg}'\n\n{}", help_text()));
            }
        }
    }

    options.first_class_mail_type = mail_type;

    let packages = package_args.iter().map(|raw| parse_package(raw, units)).collect::<Result<Vec<_>, _>>()?;

    let mode = match mode {
        Some(mode) => {
            if input_path.is_some() {
                return Err("error: --input cannot be combined with --sentence or --event".to_string());
            }
            mode
        }
        None => {
            let source = input_path.as_deref().unwrap_or("-");
            let body = read_body(input_path.as_deref())
                .map_err(|err| format!("error: failed to read '{source}': {err}"))?;
            Mode::Response(body)
        }
    };

    if let Mode::Response(body) = &mode {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(format!("error: no input provided\n\n{}", help_text()));
        }
    }

    Ok(CliConfig { mode, packages, tracking_number, options, verbose, color })
}

/// `WEIGHT:LxWxH`, e.g. `32:10x7x2`.
fn parse_package(raw: &str, units: UnitSystem) -> Result<Package, String> {
    let invalid = || format!("error: invalid --package '{raw}' (expected WEIGHT:LxWxH)");

    let (weight, dims) = raw.split_once(':').ok_or_else(invalid)?;
    let weight: f64 = weight.trim().parse().map_err(|_| invalid())?;
    let dims: Vec<f64> =
        dims.split(['x', 'X']).map(|d| d.trim().parse::<f64>()).collect::<Result<_, _>>().map_err(|_| invalid())?;
    let dims: [f64; 3] = dims.try_into().map_err(|_| invalid())?;

    if weight < 0.0 || dims.iter().any(|d| *d < 0.0) {
        return Err(invalid());
    }
    Ok(Package::new(weight, dims, units))
}

/// The response body from `path`, or stdin when it is absent or `-`.
fn read_body(path: Option<&str>) -> mailpiece::Result<Vec<u8>> {
    match path {
        Some("-") | None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
        Some(path) => Ok(std::fs::read(path)?),
    }
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "mailpiece {version}

Interpret USPS Web Tools responses.

Usage:
  mailpiece [OPTIONS] [--input <file>]       Interpret a rate or tracking response
  mailpiece [OPTIONS] --sentence <text>      Parse a size-limit sentence
  mailpiece [OPTIONS] --event <text>         Parse one narrated tracking line

Options:
  -i, --input <file>         Response body to read. Reads stdin when omitted or '-'.
  -p, --package <w:LxWxH>    Package to check rates against (repeatable, in
                             request order). Ounces and inches by default.
  --metric                   Read --package values as grams and centimetres.
  -t, --tracking-number <n>  Tracking number reported for tracking responses.
  --account <type>           retail (default), commercial_base or commercial_plus.
  --service <code>           Requested service, e.g. 'FIRST CLASS'.
  --mail-type <type>         First-class mail type sent with the request.
  --lenient                  Keep services whose limit sentence is not understood.
  -v, --verbose              Debug logging (rule traces, skipped services).
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  Response error or nothing recognised.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}
