//! Argument definitions

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use sidebar_doc::{Depth, HeadingPath};
use sidebar_group::GroupBy;
use std::path::PathBuf;
use std::time::Duration;

/// Flags shared by every subcommand
#[derive(Debug, Clone)]
pub(crate) struct Global {
    pub(crate) config: Option<PathBuf>,
    pub(crate) timeout: Duration,
    pub(crate) log_json: bool,
}

/// Parsed subcommand
#[derive(Debug, Clone)]
pub(crate) enum Action {
    Show {
        files: Vec<PathBuf>,
        json: bool,
    },
    Query {
        files: Vec<PathBuf>,
        query: String,
        narrow: Option<HeadingPath>,
        group_by: Option<GroupBy>,
        sort: Vec<String>,
        title: Option<String>,
        json: bool,
    },
    Tree {
        file: PathBuf,
        at: Option<usize>,
    },
    Jump {
        file: PathBuf,
        at: usize,
        depth: Option<Depth>,
    },
    Refresh {
        files: Vec<PathBuf>,
        watch: bool,
        interval: Duration,
    },
}

fn files_arg() -> Arg {
    Arg::new("files")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .help("Outline files (.org, .md)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn line_arg(required: bool) -> Arg {
    Arg::new("at")
        .long("at")
        .required(required)
        .value_parser(value_parser!(usize))
        .help("1-based line number")
}

pub(crate) fn command() -> Command {
    Command::new("sidebar")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Query-driven sidebars and tree mirrors for outline documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("timeout-ms")
                .long("timeout-ms")
                .global(true)
                .default_value("10000")
                .value_parser(value_parser!(u64))
                .help("Abandon the command after this many milliseconds"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("show")
                .about("Show the default sidebar")
                .arg(files_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("query")
                .about("Show a sidebar for an ad-hoc query")
                .arg(files_arg())
                .arg(
                    Arg::new("query")
                        .long("query")
                        .short('q')
                        .required(true)
                        .help("Query predicate, e.g. (and (todo) (priority \"A\"))"),
                )
                .arg(
                    Arg::new("narrow")
                        .long("narrow")
                        .value_parser(|s: &str| s.parse::<HeadingPath>())
                        .help("Only search below this heading path (Projects/Website)"),
                )
                .arg(
                    Arg::new("group-by")
                        .long("group-by")
                        .value_parser(|s: &str| s.parse::<GroupBy>())
                        .help("Group by category, parent, priority or todo"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .num_args(1..)
                        .help("Sort keys, e.g. date priority reverse-title"),
                )
                .arg(Arg::new("title").long("title").help("Sidebar title"))
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("tree")
                .about("Print the tree mirror of a document")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(line_arg(false)),
        )
        .subcommand(
            Command::new("jump")
                .about("Print the subtree view of the heading at a line")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(line_arg(true))
                .arg(
                    Arg::new("depth")
                        .long("depth")
                        .value_parser(|s: &str| s.parse::<Depth>())
                        .help("none, children, branches or entries"),
                ),
        )
        .subcommand(
            Command::new("refresh")
                .about("Recompose the default sidebar, optionally on every change")
                .arg(files_arg())
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Poll the files and re-print after each change"),
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .default_value("1000")
                        .value_parser(value_parser!(u64))
                        .help("Polling interval for --watch"),
                ),
        )
}

fn files(args: &ArgMatches) -> Vec<PathBuf> {
    args.get_many::<PathBuf>("files")
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

fn file(args: &ArgMatches) -> Result<PathBuf> {
    args.get_one::<PathBuf>("file")
        .cloned()
        .context("missing file argument")
}

/// Split matches into global flags and the subcommand
pub(crate) fn parse(matches: &ArgMatches) -> Result<(Global, Action)> {
    let global = Global {
        config: matches.get_one::<PathBuf>("config").cloned(),
        timeout: Duration::from_millis(
            matches.get_one::<u64>("timeout-ms").copied().unwrap_or(10_000),
        ),
        log_json: matches.get_flag("log-json"),
    };

    let action = match matches.subcommand() {
        Some(("show", args)) => Action::Show {
            files: files(args),
            json: args.get_flag("json"),
        },
        Some(("query", args)) => Action::Query {
            files: files(args),
            query: args
                .get_one::<String>("query")
                .cloned()
                .context("missing --query")?,
            narrow: args.get_one::<HeadingPath>("narrow").cloned(),
            group_by: args.get_one::<GroupBy>("group-by").copied(),
            sort: args
                .get_many::<String>("sort")
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
            title: args.get_one::<String>("title").cloned(),
            json: args.get_flag("json"),
        },
        Some(("tree", args)) => Action::Tree {
            file: file(args)?,
            at: args.get_one::<usize>("at").copied(),
        },
        Some(("jump", args)) => Action::Jump {
            file: file(args)?,
            at: args.get_one::<usize>("at").copied().context("missing --at")?,
            depth: args.get_one::<Depth>("depth").copied(),
        },
        Some(("refresh", args)) => Action::Refresh {
            files: files(args),
            watch: args.get_flag("watch"),
            interval: Duration::from_millis(
                args.get_one::<u64>("interval-ms").copied().unwrap_or(1000),
            ),
        },
        Some((other, _)) => anyhow::bail!("unknown subcommand '{other}'"),
        None => anyhow::bail!("no subcommand given"),
    };
    Ok((global, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> (Global, Action) {
        let matches = command().try_get_matches_from(args).unwrap();
        parse(&matches).unwrap()
    }

    #[test]
    fn query_arguments() {
        let (global, action) = parse_args(&[
            "sidebar",
            "query",
            "a.org",
            "b.md",
            "--query",
            "(todo)",
            "--narrow",
            "Projects/Website",
            "--group-by",
            "todo",
            "--sort",
            "date",
            "priority",
            "--json",
            "--timeout-ms",
            "250",
        ]);
        assert_eq!(global.timeout, Duration::from_millis(250));
        assert!(!global.log_json);
        match action {
            Action::Query {
                files,
                query,
                narrow,
                group_by,
                sort,
                json,
                ..
            } => {
                assert_eq!(files, vec![PathBuf::from("a.org"), PathBuf::from("b.md")]);
                assert_eq!(query, "(todo)");
                assert_eq!(narrow.map(|p| p.to_string()).as_deref(), Some("Projects/Website"));
                assert_eq!(group_by, Some(GroupBy::Todo));
                assert_eq!(sort, vec!["date", "priority"]);
                assert!(json);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn jump_arguments() {
        let (_, action) = parse_args(&["sidebar", "jump", "t.org", "--at", "3", "--depth", "branches"]);
        assert!(matches!(
            action,
            Action::Jump { at: 3, depth: Some(Depth::Branches), .. }
        ));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(command()
            .try_get_matches_from(["sidebar", "jump", "t.org", "--at", "1", "--depth", "deep"])
            .is_err());
        assert!(command()
            .try_get_matches_from(["sidebar", "query", "t.org", "-q", "(todo)", "--group-by", "x"])
            .is_err());
        assert!(command().try_get_matches_from(["sidebar", "jump", "t.org"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let (global, action) =
            parse_args(&["sidebar", "refresh", "t.org", "--watch", "--log-json", "--config", "s.toml"]);
        assert!(global.log_json);
        assert_eq!(global.config, Some(PathBuf::from("s.toml")));
        assert!(matches!(action, Action::Refresh { watch: true, .. }));
    }
}
