use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use curlreq::{Curl, Dialect, Parser, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Part {
    Method,
    Url,
    Header,
    Cookie,
    Body,
    Auth,
    Config,
}

fn command_arg() -> Arg {
    Arg::new("command")
        .help("The input curl command string")
        .required(true)
        .index(1)
}

fn dialect_arg() -> Arg {
    Arg::new("dialect")
        .short('d')
        .long("dialect")
        .value_name("DIALECT")
        .help("Quoting of the command: bash, cmd, or auto to detect")
        .default_value("auto")
        .value_parser(clap::value_parser!(Dialect))
}

fn cli() -> Command {
    Command::new("curlreq")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn curl commands into structured HTTP requests")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("parse")
                .about("Parses a curl command")
                .arg(command_arg())
                .arg(
                    Arg::new("part")
                        .short('p')
                        .long("part")
                        .value_name("PART")
                        .help("Print only one part of the request (method, url, header, cookie, body, auth, config)")
                        .required(false)
                        .value_parser(clap::value_parser!(Part)),
                )
                .arg(dialect_arg()),
        )
        .subcommand(
            Command::new("tokens")
                .about("Prints the words of a curl command, one per line")
                .arg(command_arg())
                .arg(dialect_arg()),
        )
}

fn parser(matches: &ArgMatches) -> Parser<'static> {
    let dialect = matches
        .get_one::<Dialect>("dialect")
        .copied()
        .unwrap_or_default();
    Parser::default().with_dialect(dialect)
}

fn print_part(curl: &Curl, part: Part) {
    match part {
        Part::Method => println!("{}", curl.method),
        Part::Url => println!("{}", curl.url),
        Part::Header => {
            for (name, value) in curl.headers.iter() {
                println!("{name}: {value}");
            }
        }
        Part::Cookie => {
            for cookie in &curl.cookies {
                println!("{}={}", cookie.name, cookie.value);
            }
        }
        Part::Body => match &curl.body {
            Some(body) => match body.to_bytes() {
                Ok(bytes) => {
                    println!("# {}", body.content_type());
                    println!("{}", String::from_utf8_lossy(&bytes));
                }
                Err(e) => eprintln!("Error serializing body: {e}"),
            },
            None => println!("(no body)"),
        },
        Part::Auth => match &curl.auth {
            Some(auth) => println!("{auth}"),
            None => println!("(no auth)"),
        },
        Part::Config => println!("{:#?}", curl.config),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("parse", sub_matches)) => {
            let Some(command) = sub_matches.get_one::<String>("command") else {
                return ExitCode::FAILURE;
            };
            match parser(sub_matches).parse(command) {
                Ok(curl) => {
                    match sub_matches.get_one::<Part>("part") {
                        Some(part) => print_part(&curl, *part),
                        None => {
                            println!("{curl}");
                            print!("{}", curl.verbose_info());
                        }
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error parsing curl command: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Some(("tokens", sub_matches)) => {
            let Some(command) = sub_matches.get_one::<String>("command") else {
                return ExitCode::FAILURE;
            };
            match parser(sub_matches).tokens(command) {
                Ok(tokens) => {
                    for token in tokens {
                        println!("{:?}", token.text());
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error tokenizing curl command: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            let _ = cli().print_help();
            println!();
            ExitCode::FAILURE
        }
    }
}
