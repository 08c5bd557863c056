//! The `quizmarks students` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};

use quizmarks_core::config::{load_config_from, StudentsConfig};
use quizmarks_core::error::StoreError;
use quizmarks_core::students::{
    RecordBackend, RecordField, SortKey, SortOrder, StorePolicy, StudentRecord, StudentStore,
};

#[derive(Subcommand)]
pub enum StudentsCommand {
    /// List every student with the class average
    List,
    /// Show students matching an id or name prefix
    Show { term: String },
    /// Show the student with the highest overall total
    Highest,
    /// Show the student with the lowest overall total
    Lowest,
    /// Class size, average, best and worst
    Summary,
    /// Sort the records
    Sort {
        /// Sort key: name, total, percentage
        #[arg(long, default_value = "name")]
        by: String,

        /// Sort order: asc, desc
        #[arg(long, default_value = "asc")]
        order: String,

        /// Write the sorted order back to the file
        #[arg(long)]
        save: bool,
    },
    /// Add a student
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        c1: i32,
        #[arg(long)]
        c2: i32,
        #[arg(long)]
        c3: i32,
        #[arg(long)]
        exam: i32,
    },
    /// Change one field of a student
    Update {
        /// Student number or name prefix
        term: String,

        /// Field: name, c1, c2, c3, exam
        #[arg(long)]
        field: String,

        #[arg(long)]
        value: String,
    },
    /// Delete a student
    Delete {
        /// Student number or name prefix
        term: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl StudentsCommand {
    fn mutates(&self) -> bool {
        match self {
            StudentsCommand::Sort { save, .. } => *save,
            StudentsCommand::Add { .. }
            | StudentsCommand::Update { .. }
            | StudentsCommand::Delete { .. } => true,
            _ => false,
        }
    }
}

pub fn execute(
    file: Option<PathBuf>,
    config_path: Option<PathBuf>,
    command: StudentsCommand,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?.students;
    if let Some(file) = file {
        config.path = file;
    }
    let mut store = open_store(&config, command.mutates())?;

    match command {
        StudentsCommand::List => {
            if store.is_empty() {
                println!("No student records.");
                return Ok(());
            }
            print_records(store.records());
            print_summary(&store);
        }
        StudentsCommand::Show { term } => {
            let matches = store.find_by_search_term(&term);
            if matches.is_empty() {
                return Err(StoreError::NoMatch(term).into());
            }
            print_records(matches);
        }
        StudentsCommand::Highest => print_one(store.highest()),
        StudentsCommand::Lowest => print_one(store.lowest()),
        StudentsCommand::Summary => print_summary(&store),
        StudentsCommand::Sort { by, order, save } => {
            let key: SortKey = by.parse().map_err(anyhow::Error::msg)?;
            let order: SortOrder = order.parse().map_err(anyhow::Error::msg)?;
            store.sort_by(key, order);
            print_records(store.records());
            if save {
                store.save()?;
                println!("Saved sorted order to {}", config.path.display());
            }
        }
        StudentsCommand::Add {
            id,
            name,
            c1,
            c2,
            c3,
            exam,
        } => {
            let record = StudentRecord::new(id.trim(), name.trim(), [c1, c2, c3], exam);
            let label = format!("{} [{}]", record.name, record.id);
            store.add(record)?;
            println!("Added {label}");
        }
        StudentsCommand::Update { term, field, value } => {
            let field: RecordField = field.parse().map_err(anyhow::Error::msg)?;
            let updated = store.update(&term, field, &value)?;
            println!("Updated {} of {} [{}]", field.label(), updated.name, updated.id);
            print_records([&updated]);
        }
        StudentsCommand::Delete { term, yes } => {
            if !yes {
                if let [target] = store.find_by_search_term(&term).as_slice() {
                    let prompt = format!("Delete {} [{}]? [y/N] ", target.name, target.id);
                    if !confirm(&prompt)? {
                        println!("Cancelled.");
                        return Ok(());
                    }
                }
            }
            let removed = store.delete(&term)?;
            println!("Deleted {} [{}]", removed.name, removed.id);
        }
    }

    Ok(())
}

/// Open the store. Read-only commands fall back to an empty store when the
/// file cannot be loaded.
fn open_store(config: &StudentsConfig, mutating: bool) -> Result<StudentStore> {
    let policy = if mutating {
        config.policy()
    } else {
        StorePolicy::read_only()
    };

    match StudentStore::open(config.backend(), policy) {
        Ok(store) => Ok(store),
        Err(e) if !mutating && e.is_load_failure() => {
            tracing::warn!("continuing with no records: {e}");
            eprintln!("Warning: {e}");
            Ok(StudentStore::empty(config.backend()))
        }
        Err(e) => Err(e).with_context(|| {
            format!("failed to load student records from {}", config.path.display())
        }),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_records<'a>(records: impl IntoIterator<Item = &'a StudentRecord>) {
    let mut table = Table::new();
    table.set_header(vec![
        "Student No.",
        "Name",
        "Coursework",
        "Exam",
        "Overall",
        "Percent",
        "Grade",
    ]);

    for r in records {
        table.add_row(vec![
            Cell::new(&r.id),
            Cell::new(&r.name),
            Cell::new(r.coursework_total()),
            Cell::new(r.exam),
            Cell::new(r.overall_total()),
            Cell::new(format!("{:.1}%", r.percentage())),
            Cell::new(r.grade()),
        ]);
    }

    println!("{table}");
}

fn print_one(record: Option<&StudentRecord>) {
    match record {
        Some(record) => print_records([record]),
        None => println!("No student records."),
    }
}

fn print_summary<B: RecordBackend>(store: &StudentStore<B>) {
    let Some(summary) = store.summary() else {
        println!("No student records.");
        return;
    };
    println!(
        "Students: {}  Class average: {:.1}%",
        summary.count, summary.average_percentage
    );
    if let (Some(best), Some(worst)) = (store.highest(), store.lowest()) {
        println!(
            "Highest: {} ({})  Lowest: {} ({})",
            best.name,
            best.overall_total(),
            worst.name,
            worst.overall_total()
        );
    }
}
