// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, ArgGroup, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn period_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("period")
            .long("period")
            .help("thisMonth|lastMonth|thisQuarter|lastQuarter|thisYear|lastYear"),
    )
    .arg(Arg::new("from").long("from").help("Custom range start (YYYY-MM-DD)"))
    .arg(
        Arg::new("to")
            .long("to")
            .conflicts_with("period")
            .help("Custom range end (YYYY-MM-DD)"),
    )
    .group(ArgGroup::new("window").args(["period", "from"]).multiple(false))
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Record id")
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(required))
        .arg(Arg::new("description").long("description").short('d').required(required))
        .arg(Arg::new("category").long("category").short('c').required(required).help("Category id"))
        .arg(Arg::new("type").long("type").short('t').help("income|expense"))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
        .arg(Arg::new("notes").long("notes"))
        .arg(Arg::new("frequency").long("frequency").help("daily|weekly|monthly|yearly"))
        .arg(Arg::new("receipt").long("receipt").help("Image file to attach"))
}

fn sub_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(Arg::new("cycle").long("cycle").help("monthly|quarterly|yearly"))
        .arg(Arg::new("start").long("start").help("YYYY-MM-DD, defaults to today"))
        .arg(Arg::new("renewal").long("renewal").help("Next renewal, defaults to the first cycle date on or after today"))
        .arg(Arg::new("category").long("category").short('c').help("Category id"))
        .arg(Arg::new("description").long("description").short('d'))
        .arg(Arg::new("color").long("color"))
}

fn budget_fields(cmd: Command, required: bool) -> Command {
    let period = Arg::new("period").long("period").help("monthly|quarterly|yearly");
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(if required { period.default_value("monthly") } else { period })
        .arg(Arg::new("category").long("category").short('c').help("Category id, empty for all expenses"))
        .arg(Arg::new("start").long("start").help("YYYY-MM-DD, defaults to today"))
        .arg(Arg::new("end").long("end"))
        .arg(Arg::new("color").long("color"))
}

fn category_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("name").long("name").required(required))
        .arg(Arg::new("type").long("type").short('t').required(required).help("income|expense"))
        .arg(Arg::new("color").long("color").required(required).help("#rrggbb"))
        .arg(Arg::new("icon").long("icon"))
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .about("Personal finance tracker: transactions, subscriptions, budgets and reports")
        .version(crate_version!())
        .subcommand_required(false)
        .subcommand(Command::new("init").about("Create the database and seed default categories"))
        .subcommand(
            Command::new("tx")
                .about("Transactions")
                .subcommand(
                    tx_fields(Command::new("add"), true)
                        .arg(
                            Arg::new("recurring")
                                .long("recurring")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    json_flags(period_args(Command::new("list")))
                        .arg(Arg::new("category").long("category").short('c').help("Category id"))
                        .arg(Arg::new("type").long("type").short('t').help("income|expense"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )
                .subcommand(
                    tx_fields(Command::new("edit").arg(id_arg()), false).arg(
                        Arg::new("recurring")
                            .long("recurring")
                            .value_parser(value_parser!(bool))
                            .help("true|false"),
                    ),
                )
                .subcommand(Command::new("rm").arg(id_arg())),
        )
        .subcommand(
            Command::new("sub")
                .about("Subscriptions")
                .subcommand(
                    sub_fields(Command::new("add"), true)
                        .arg(Arg::new("inactive").long("inactive").action(ArgAction::SetTrue)),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(
                    sub_fields(Command::new("edit").arg(id_arg()), false).arg(
                        Arg::new("active")
                            .long("active")
                            .value_parser(value_parser!(bool))
                            .help("true|false"),
                    ),
                )
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    json_flags(Command::new("renewals")).arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize))
                            .default_value("3"),
                    ),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Budgets")
                .subcommand(budget_fields(Command::new("add"), true))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(budget_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(json_flags(Command::new("progress"))),
        )
        .subcommand(
            Command::new("category")
                .about("Categories")
                .subcommand(category_fields(Command::new("add"), true))
                .subcommand(
                    json_flags(Command::new("list"))
                        .arg(Arg::new("type").long("type").short('t').help("income|expense")),
                )
                .subcommand(category_fields(Command::new("edit").arg(id_arg()), false))
                .subcommand(
                    Command::new("rm").arg(id_arg()).arg(
                        Arg::new("force")
                            .long("force")
                            .action(ArgAction::SetTrue)
                            .help("Delete even if records still reference it"),
                    ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_flags(period_args(Command::new("summary"))))
                .subcommand(
                    period_args(Command::new("csv"))
                        .arg(Arg::new("out").long("out").short('o').help("Output file or directory")),
                )
                .subcommand(json_flags(period_args(Command::new("spend-by-category")))),
        )
        .subcommand(
            Command::new("export")
                .about("Write all data to a JSON file")
                .arg(Arg::new("out").long("out").short('o').help("Output file or directory")),
        )
        .subcommand(
            Command::new("import")
                .about("Replace data with the collections found in a JSON export")
                .arg(Arg::new("file").required(true)),
        )
        .subcommand(
            Command::new("receipt")
                .about("Stored receipt images")
                .subcommand(
                    Command::new("show")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("out").long("out").short('o').help("Write the decoded image here")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("key").required(true))),
        )
        .subcommand(Command::new("doctor").about("Report records pointing at missing categories"))
}
