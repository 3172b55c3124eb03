//! Command-line front end for the student registry.
//!
//! # Responsibility
//! - Turn command-line input into validated registry calls.
//! - Print registry results for a human or as JSON.

use aluno_core::{
    default_log_level, init_logging, init_stderr_logging, AppConfig, RegistryError, SortKey,
    Student, StudentForm, StudentMirror, StudentRegistry,
};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;

const STDERR_LOG_LEVEL: &str = "warn";

/// Student registry backed by a flat file and a SQLite mirror.
#[derive(Parser)]
#[command(name = "aluno", version, about = "Student registry")]
struct Cli {
    /// Flat snapshot file.
    #[arg(long, global = true, default_value = aluno_core::config::DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// SQLite mirror database.
    #[arg(long, global = true, default_value = aluno_core::config::DEFAULT_DATABASE_FILE)]
    db: PathBuf,

    /// Skip the SQLite mirror entirely.
    #[arg(long, global = true)]
    no_db: bool,

    /// Absolute directory for rolling log files.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error. Defaults to `warn` when
    /// logging to stderr.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Register a student at the end of the list.
    Add(StudentArgs),
    /// Register a student at a zero-based position.
    InsertAt {
        /// Target index, 0..=count.
        #[arg(allow_negative_numbers = true)]
        position: i64,
        #[command(flatten)]
        student: StudentArgs,
    },
    /// Register a student at the third position, or at the end of short lists.
    InsertThird(StudentArgs),
    /// Replace the student with the same id.
    Update(StudentArgs),
    /// Show one student.
    Find { id: String },
    /// Remove one student.
    Remove { id: String },
    /// List all students.
    List {
        /// Sort before listing: name, id or age.
        #[arg(long)]
        sort: Option<SortKey>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Show the youngest and the oldest student.
    Extremes,
    /// Print the number of registered students.
    Count,
    /// Remove every student from the flat file.
    Clear,
}

/// Student fields as typed on the command line.
#[derive(Args)]
struct StudentArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    /// dd/mm/yyyy
    #[arg(long)]
    birth_date: String,
    /// (##)####-#### or (##)#####-####
    #[arg(long)]
    phone: String,
    /// ###.###.###-## or 11 digits
    #[arg(long)]
    tax_id: String,
}

impl StudentArgs {
    fn into_student(self) -> Result<Student, String> {
        StudentForm {
            id: self.id,
            name: self.name,
            birth_date: self.birth_date,
            phone: self.phone,
            tax_id: self.tax_id,
        }
        .into_student()
        .map_err(|err| err.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    let config = AppConfig {
        data_file: cli.data_file,
        database: (!cli.no_db).then_some(cli.db),
        log_level: cli.log_level.unwrap_or_else(|| {
            let level = if cli.log_dir.is_some() {
                default_log_level()
            } else {
                STDERR_LOG_LEVEL
            };
            level.to_string()
        }),
        log_dir: cli.log_dir,
    };

    let logging = match config.log_dir.as_ref() {
        Some(log_dir) => init_logging(&config.log_level, &log_dir.to_string_lossy()),
        None => init_stderr_logging(&config.log_level),
    };
    if let Err(err) = logging {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut registry = config.open_registry();
    if let Err(message) = run(cli.command, &mut registry) {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run<M: StudentMirror>(
    command: Commands,
    registry: &mut StudentRegistry<M>,
) -> Result<(), String> {
    match command {
        Commands::Add(args) => {
            let student = args.into_student()?;
            let id = student.id.clone();
            registry.add(student).map_err(describe)?;
            println!("added {id}; total students: {}", registry.len());
        }
        Commands::InsertAt { position, student } => {
            let student = student.into_student()?;
            let id = student.id.clone();
            let position = usize::try_from(position).map_err(|_| {
                format!(
                    "invalid position {position}; the registry has {} students",
                    registry.len()
                )
            })?;
            registry.insert_at(student, position).map_err(describe)?;
            println!("inserted {id} at position {position}; total students: {}", registry.len());
        }
        Commands::InsertThird(args) => {
            let student = args.into_student()?;
            let id = student.id.clone();
            registry.insert_third(student).map_err(describe)?;
            println!("inserted {id}; total students: {}", registry.len());
        }
        Commands::Update(args) => {
            let student = args.into_student()?;
            let id = student.id.clone();
            if !registry.update(student) {
                return Err(format!("student `{id}` not found"));
            }
            println!("updated {id}");
        }
        Commands::Find { id } => match registry.find_by_id(&id) {
            Some(student) => {
                println!("{student}");
                println!("total students: {}", registry.len());
            }
            None => {
                return Err(format!(
                    "student `{id}` not found; total students: {}",
                    registry.len()
                ))
            }
        },
        Commands::Remove { id } => match registry.remove_by_id(&id) {
            Some(removed) => println!("removed {}; total students: {}", removed.id, registry.len()),
            None => return Err(format!("student `{id}` not found")),
        },
        Commands::List { sort, json } => {
            if let Some(key) = sort {
                registry.sort_by(key);
            }
            if json {
                let text = serde_json::to_string_pretty(registry.list())
                    .map_err(|err| format!("failed to encode students: {err}"))?;
                println!("{text}");
            } else {
                for student in registry.list() {
                    println!("{student}");
                }
                println!("total students: {}", registry.len());
            }
        }
        Commands::Extremes => {
            let extremes = registry.extremes();
            match (extremes.youngest, extremes.oldest) {
                (Some(youngest), Some(oldest)) => {
                    println!("youngest: {youngest}");
                    println!("oldest:   {oldest}");
                }
                _ => println!("no students registered"),
            }
        }
        Commands::Count => println!("{}", registry.len()),
        Commands::Clear => {
            registry.clear();
            println!("all students removed");
        }
    }
    Ok(())
}

fn describe(err: RegistryError) -> String {
    match err {
        RegistryError::DuplicateKey(id) => format!("student `{id}` is already registered"),
        other => other.to_string(),
    }
}
