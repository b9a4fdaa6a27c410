use anyhow::{Context, Result, anyhow};
use colored::*;
use comfy_table::{Attribute, Cell, ContentArrangement, Table, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process::Command;

use rewind::adapters::selector::{adapter_for, detect_kind, select_adapter_for_target};
use rewind::config::{ConnectionStrings, SessionRecord};
use rewind::registry;
use rewind::{SnapshotOptions, Snapshotter};

use crate::cli::SnapshotArgs;

/// Global flags every command needs to reach the database.
pub struct Target {
    pub connection: Option<String>,
    pub config: Option<PathBuf>,
}

impl Target {
    fn connection_strings(&self) -> Result<ConnectionStrings> {
        match &self.config {
            Some(path) => ConnectionStrings::load(path),
            None => ConnectionStrings::discover(&std::env::current_dir()?),
        }
    }

    fn resolve(&self) -> Result<String> {
        if let Some(cs) = self.connection.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok(cs.to_string());
        }
        self.connection_strings()?
            .last()
            .map(|entry| entry.connection_string.clone())
            .ok_or_else(|| {
                anyhow!("no connection string given; pass --connection, add rewind.json or set REWIND_CONNECTION_STRING")
            })
    }

    fn snapshotter(&self, tables: Option<Vec<String>>, suffix: Option<String>) -> Result<Snapshotter> {
        let connection_string = self.resolve()?;
        let adapter = select_adapter_for_target(&connection_string)?;
        let mut builder = Snapshotter::builder()
            .adapter(adapter)
            .connection_string(connection_string);
        if let Some(tables) = tables {
            builder = builder.tables(tables);
        }
        if let Some(suffix) = suffix {
            builder = builder.suffix(suffix);
        }
        Ok(builder.build()?)
    }
}

pub fn do_snapshot(target: &Target, args: SnapshotArgs, revert_previous: bool) -> Result<()> {
    let root = std::env::current_dir()?;

    if let Some(previous) = registry::load_session(&root)? {
        if revert_previous {
            revert_record(target, &previous)?;
            registry::clear_session(&root)?;
        } else {
            eprintln!(
                "{} {}: {}",
                "!".yellow().bold(),
                "Warning".yellow(),
                format!(
                    "leaving backups with suffix '{}' from {} in place",
                    previous.suffix,
                    previous.created_at.format("%Y-%m-%d %H:%M:%S")
                )
            );
        }
    }

    let mut snapshotter = target.snapshotter(None, args.suffix)?;
    let bar = create_progress_bar("Taking snapshot");
    snapshotter.take_snapshot(SnapshotOptions {
        tables: args.tables,
        force_discovery: args.discover,
        revert_previous: false,
    })?;
    bar.finish_and_clear();

    let record = SessionRecord::new(
        snapshotter.tables().to_vec(),
        snapshotter.suffix(),
        snapshotter.adapter_name(),
    );
    registry::save_session(&root, &record)?;

    println!(
        "{} {}",
        "✔".green().bold(),
        format!(
            "Snapshot of {} table(s) taken with suffix '{}'",
            record.tables.len(),
            record.suffix
        )
        .green()
    );
    Ok(())
}

pub fn do_revert(target: &Target) -> Result<()> {
    let root = std::env::current_dir()?;
    let record = registry::load_session(&root)?
        .ok_or_else(|| anyhow!("no snapshot session found in {}", registry::session_path(&root).display()))?;

    revert_record(target, &record)?;
    registry::clear_session(&root)?;

    println!(
        "{} {}",
        "✔".green().bold(),
        format!("Reverted {} table(s)", record.tables.len()).green()
    );
    Ok(())
}

/// Returns the exit code of the wrapped command.
pub fn do_run(target: &Target, args: SnapshotArgs, command: Vec<String>) -> Result<i32> {
    let (program, program_args) = command
        .split_first()
        .ok_or_else(|| anyhow!("no command given to run"))?;

    let mut snapshotter = target.snapshotter(args.tables, args.suffix)?;
    let bar = create_progress_bar("Taking snapshot");
    snapshotter.take_snapshot(SnapshotOptions {
        tables: None,
        force_discovery: args.discover,
        revert_previous: false,
    })?;
    bar.finish_and_clear();
    println!(
        "{} {}",
        "i".yellow().bold(),
        format!("Tracking {} table(s) with suffix '{}'", snapshotter.tables().len(), snapshotter.suffix()).yellow()
    );

    let status = Command::new(program).args(program_args).status();

    let bar = create_progress_bar("Reverting changes");
    let reverted = snapshotter.revert_changes();
    bar.finish_and_clear();
    reverted.with_context(|| {
        format!(
            "revert failed; backup tables {} may need manual cleanup",
            snapshotter.backup_table_names().join(", ")
        )
    })?;
    println!("{} {}", "✔".green().bold(), "Tables reverted".green());

    let status = status.with_context(|| format!("failed to start '{}'", program))?;
    Ok(status.code().unwrap_or(1))
}

pub fn do_tables(target: &Target) -> Result<()> {
    let connection_string = target.resolve()?;
    let mut adapter = select_adapter_for_target(&connection_string)?;

    adapter.open_connection(&connection_string)?;
    let listed = adapter.list_tables();
    adapter.close_connection()?;
    let tables = listed?;

    if tables.is_empty() {
        println!("{} {}", "i".yellow().bold(), "No tables found".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Table").add_attribute(Attribute::Bold),
        ]);
    for (i, name) in tables.iter().enumerate() {
        table.add_row(vec![Cell::new(i + 1), Cell::new(name)]);
    }

    println!("{}", table);
    Ok(())
}

pub fn do_version() {
    println!("rewind {}", env!("CARGO_PKG_VERSION"));
}

fn revert_record(target: &Target, record: &SessionRecord) -> Result<()> {
    let connection_string = target.resolve()?;
    let kind = detect_kind(&connection_string);
    if kind.name() != record.adapter {
        return Err(anyhow!(
            "snapshot was taken with the {} adapter but the connection string selects {}",
            record.adapter,
            kind.name()
        ));
    }

    let mut snapshotter = Snapshotter::builder()
        .adapter(adapter_for(kind)?)
        .connection_string(connection_string)
        .suffix(record.suffix.clone())
        .build()?;
    snapshotter.adopt_snapshot(record.tables.clone());

    let bar = create_progress_bar("Reverting changes");
    snapshotter.revert_changes()?;
    bar.finish_and_clear();
    Ok(())
}

fn create_progress_bar(prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    bar.set_message(prefix.to_string());
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar
}
