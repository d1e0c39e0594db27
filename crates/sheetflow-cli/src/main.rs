//! `sheetflow` - ticket desk on a spreadsheet, from the command line

mod output;

use anyhow::{anyhow, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use output::{Output, Reply};
use sheetflow_core::{NewTask, Priority, SheetFlow, TaskStatus};
use sheetflow_table::record::cell;
use sheetflow_table::{HttpTransport, Record, SheetTable, SheetsConfig};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type Flow = SheetFlow<HttpTransport>;

fn cli() -> Command {
    let row = || {
        Arg::new("row")
            .required(true)
            .value_parser(value_parser!(usize))
            .help("Zero-based grid row (the header is row 0)")
    };
    let text = |name: &'static str, help: &'static str| Arg::new(name).required(true).help(help);

    Command::new("sheetflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tickets, projects and kanban boards kept in a spreadsheet")
        .subcommand_required(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print results as JSON"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs on stderr as JSON lines"),
        )
        .subcommand(
            Command::new("tickets")
                .about("Support tickets")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List tickets, newest first"))
                .subcommand(
                    Command::new("submit").about("Submit a ticket").arg(
                        Arg::new("field")
                            .long("field")
                            .short('f')
                            .required(true)
                            .action(ArgAction::Append)
                            .value_parser(parse_field)
                            .help("Ticket field as NAME=VALUE, repeatable"),
                    ),
                )
                .subcommand(
                    Command::new("status")
                        .about("Set a ticket's status")
                        .arg(row())
                        .arg(text("status", "New status")),
                ),
        )
        .subcommand(
            Command::new("members")
                .about("Team members")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List members"))
                .subcommand(
                    Command::new("add")
                        .about("Add a member")
                        .arg(text("name", "Member name"))
                        .arg(text("team", "Team name")),
                ),
        )
        .subcommand(
            Command::new("projects")
                .about("Projects promoted from tickets")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List projects"))
                .subcommand(
                    Command::new("from-ticket")
                        .about("Create a project from the ticket at ROW")
                        .arg(row()),
                )
                .subcommand(
                    Command::new("init-kanban")
                        .about("Create the kanban board of the project at ROW")
                        .arg(row()),
                ),
        )
        .subcommand(
            Command::new("kanban")
                .about("Kanban tasks")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("List a project's tasks")
                        .arg(text("project", "Project ID")),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a task")
                        .arg(text("project", "Project ID"))
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("type").long("type").default_value("Task"))
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .default_value("Medium")
                                .help("Low, Medium, High or Critical"),
                        )
                        .arg(Arg::new("assignee").long("assignee"))
                        .arg(Arg::new("due").long("due").help("Due date"))
                        .arg(Arg::new("tag").long("tag").action(ArgAction::Append)),
                )
                .subcommand(
                    Command::new("move")
                        .about("Move a task to another column")
                        .arg(text("task", "Task ID"))
                        .arg(text("status", "todo, inprogress, review or done")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a task")
                        .arg(text("task", "Task ID")),
                ),
        )
        .subcommand(
            Command::new("questions")
                .about("Per-team intake form questions")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list")
                        .about("List a team's questions")
                        .arg(text("team", "Team name")),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a question")
                        .arg(text("team", "Team name"))
                        .arg(text("text", "Question text")),
                )
                .subcommand(
                    Command::new("update")
                        .about("Reword a question")
                        .arg(text("team", "Team name"))
                        .arg(text("old", "Current text"))
                        .arg(text("new", "New text")),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a question")
                        .arg(text("team", "Team name"))
                        .arg(text("text", "Question text")),
                ),
        )
        .subcommand(
            Command::new("table")
                .about("Raw table access")
                .subcommand_required(true)
                .subcommand(
                    Command::new("read")
                        .about("Print a tab")
                        .arg(text("name", "Tab name")),
                )
                .subcommand(
                    Command::new("add-column")
                        .about("Append a column")
                        .arg(text("name", "Tab name"))
                        .arg(text("column", "Column header")),
                )
                .subcommand(
                    Command::new("rename-column")
                        .about("Rename a column")
                        .arg(text("name", "Tab name"))
                        .arg(text("old", "Current header"))
                        .arg(text("new", "New header")),
                )
                .subcommand(
                    Command::new("delete-column")
                        .about("Delete a column and its values")
                        .arg(text("name", "Tab name"))
                        .arg(text("column", "Column header")),
                ),
        )
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got \"{s}\"")),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn connect() -> anyhow::Result<Flow> {
    let config = SheetsConfig::from_env().context("loading spreadsheet configuration")?;
    let transport = HttpTransport::from_config(&config).context("building HTTP transport")?;
    tracing::debug!(spreadsheet = %config.spreadsheet_id, "connected");
    Ok(SheetFlow::new(SheetTable::new(transport)))
}

fn arg<'a>(args: &'a ArgMatches, name: &str) -> &'a str {
    args.get_one::<String>(name).map_or("", String::as_str)
}

fn row_arg(args: &ArgMatches) -> usize {
    args.get_one::<usize>("row").copied().unwrap_or_default()
}

fn done<T, E: std::fmt::Display>(result: Result<T, E>) -> Output {
    Output::Reply(Reply::from_result(result.map(|_| None)))
}

fn done_with_id<E: std::fmt::Display>(result: Result<String, E>) -> Output {
    Output::Reply(Reply::from_result(result.map(Some)))
}

async fn run(matches: &ArgMatches) -> anyhow::Result<Output> {
    let flow = connect()?;
    let (group, args) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing command"))?;
    let (action, args) = args
        .subcommand()
        .ok_or_else(|| anyhow!("missing {group} action"))?;

    let output = match (group, action) {
        ("tickets", "list") => {
            let mut grid = flow.list_tickets().await?;
            if grid.len() > 1 {
                grid[1..].reverse();
            }
            Output::grid(grid)
        }
        ("tickets", "submit") => {
            let fields: Record = args
                .get_many::<(String, String)>("field")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            done_with_id(flow.submit_ticket(fields).await)
        }
        ("tickets", "status") => {
            done(flow.update_ticket_status(row_arg(args), arg(args, "status")).await)
        }

        ("members", "list") => Output::grid(flow.list_members().await?),
        ("members", "add") => done(flow.add_member(arg(args, "name"), arg(args, "team")).await),

        ("projects", "list") => Output::grid(flow.list_projects().await?),
        ("projects", "from-ticket") => {
            let row = row_arg(args);
            let tickets = flow.list_tickets().await?;
            let values = tickets
                .get(row)
                .filter(|_| row > 0)
                .ok_or_else(|| anyhow!("no ticket at row {row}"))?;
            done_with_id(flow.create_project_from_ticket(row, values).await)
        }
        ("projects", "init-kanban") => {
            let row = row_arg(args);
            let projects = flow.list_projects().await?;
            let project_id = projects
                .first()
                .and_then(|h| h.iter().position(|c| c == sheetflow_core::projects::PROJECT_ID))
                .zip(projects.get(row).filter(|_| row > 0))
                .map(|(col, values)| cell(values, col).to_string())
                .ok_or_else(|| anyhow!("no project at row {row}"))?;
            done_with_id(flow.initialize_kanban(row, &project_id).await)
        }

        ("kanban", "list") => {
            let tasks = flow.kanban_tasks(arg(args, "project")).await?;
            let mut grid = vec![["Task ID", "Status", "Priority", "Assignee", "Due Date", "Title"]
                .map(String::from)
                .to_vec()];
            grid.extend(tasks.iter().map(|t| {
                vec![
                    t.id.clone(),
                    t.status.to_string(),
                    t.priority.to_string(),
                    t.assignee.clone(),
                    t.due_date.clone(),
                    t.title.clone(),
                ]
            }));
            Output::Table {
                grid,
                json: serde_json::to_value(&tasks)?,
            }
        }
        ("kanban", "add") => {
            let priority: Priority = arg(args, "priority").parse()?;
            let task = NewTask::new(arg(args, "title"))
                .with_description(arg(args, "description"))
                .with_type(arg(args, "type"))
                .with_priority(priority)
                .with_assignee(arg(args, "assignee"))
                .with_due_date(arg(args, "due"))
                .with_tags(args.get_many::<String>("tag").into_iter().flatten().cloned());
            done_with_id(flow.add_kanban_task(arg(args, "project"), &task).await)
        }
        ("kanban", "move") => {
            let status: TaskStatus = arg(args, "status").parse()?;
            done(flow.move_kanban_task(arg(args, "task"), status).await)
        }
        ("kanban", "delete") => done(flow.delete_kanban_task(arg(args, "task")).await),

        ("questions", "list") => {
            let questions = flow.form_questions(arg(args, "team")).await?;
            let mut grid = vec![["ID", "Type", "Question", "Options"].map(String::from).to_vec()];
            grid.extend(questions.iter().map(|q| {
                vec![
                    q.id.clone(),
                    format!("{:?}", q.question_type),
                    q.question_text.clone(),
                    q.options.join("; "),
                ]
            }));
            Output::Table {
                grid,
                json: serde_json::to_value(&questions)?,
            }
        }
        ("questions", "add") => {
            done(flow.add_form_question(arg(args, "team"), arg(args, "text")).await)
        }
        ("questions", "update") => done(
            flow.update_form_question(arg(args, "team"), arg(args, "old"), arg(args, "new"))
                .await,
        ),
        ("questions", "delete") => {
            done(flow.delete_form_question(arg(args, "team"), arg(args, "text")).await)
        }

        ("table", "read") => Output::grid(flow.table().read_table(arg(args, "name")).await?),
        ("table", "add-column") => done(
            flow.table()
                .add_column(arg(args, "name"), arg(args, "column"))
                .await,
        ),
        ("table", "rename-column") => done(
            flow.table()
                .rename_column(arg(args, "name"), arg(args, "old"), arg(args, "new"))
                .await,
        ),
        ("table", "delete-column") => done(
            flow.table()
                .delete_column(arg(args, "name"), arg(args, "column"))
                .await,
        ),

        (group, action) => return Err(anyhow!("unknown command {group} {action}")),
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));
    let json = matches.get_flag("json");

    let output = match run(&matches).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "command failed");
            Output::Reply(Reply::from_result(Err::<Option<String>, _>(format!("{e:#}"))))
        }
    };

    match output.render(json) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }
    if output.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
