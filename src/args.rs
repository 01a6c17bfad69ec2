use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

use crate::config::Args;

fn command() -> Command {
    Command::new("sitegen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build a static documentation site from HTML and JSON content fragments.")
        .arg(
            Arg::new("content")
                .short('c')
                .long("content")
                .value_parser(clap::value_parser!(PathBuf))
                .value_name("CONTENT_DIR")
                .help("Content root to compile (default: contents)"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_parser(clap::value_parser!(PathBuf))
                .value_name("TEMPLATE")
                .help("Master template wrapping every page (default: tmpl.html)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::value_parser!(PathBuf))
                .value_name("OUTPUT_DIR")
                .help("Directory the site is written to (default: _site)"),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_parser(clap::value_parser!(String))
                .value_name("URL")
                .help("Public root URL of the site, used for canonical and share URLs"),
        )
        .arg(
            Arg::new("description")
                .short('d')
                .long("description")
                .value_parser(clap::value_parser!(String))
                .value_name("TEXT")
                .help("Site description passed to the template as Desc"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(clap::value_parser!(PathBuf))
                .value_name("FILE")
                .help("JSON configuration file; flags override its values"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue)
                .help("Enables verbose output"),
        )
}

/// parse command line arguments
pub fn parse_args() -> Args {
    args_from_matches(&command().get_matches())
}

fn args_from_matches(matches: &ArgMatches) -> Args {
    Args {
        content: matches.get_one::<PathBuf>("content").cloned(),
        template: matches.get_one::<PathBuf>("template").cloned(),
        output: matches.get_one::<PathBuf>("output").cloned(),
        url: matches.get_one::<String>("url").cloned(),
        description: matches.get_one::<String>("description").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        verbose: matches.get_flag("verbose"),
    }
}
