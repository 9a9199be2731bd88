//! # Idefix Reconciler Entry Point
//!
//! Command-line host for the reconcilers. Desired state is read from JSON
//! files; observed state is written to stdout as JSON. Logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use idefix_reconciler::{
    ReadOutcome, Reconciler, Session,
    config::ConfigLoader,
    reconciler::{CiLookup, CiReconciler, ProjectLookup, ProjectReconciler, ProjectsQuery},
    schema::ResourceSchema,
    telemetry::{
        TraceContext, current_operation, current_trace_id, init_tracing, with_trace_context,
    },
};

#[derive(Parser)]
#[command(name = "idefix")]
#[command(about = "Converge CIs and projects on the Idefix inventory service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage a CI and its sub-resources
    #[command(subcommand)]
    Ci(ResourceCommand),
    /// Manage a project
    #[command(subcommand)]
    Project(ResourceCommand),
    /// Search projects
    #[command(subcommand)]
    Projects(ProjectsCommand),
    /// Look up an existing record without managing it
    #[command(subcommand)]
    Lookup(LookupCommand),
    /// Print the field table of a resource
    #[command(subcommand)]
    Schema(SchemaCommand),
}

#[derive(Subcommand)]
enum ResourceCommand {
    /// Create the record described by a JSON file
    Create(FileArgs),
    /// Read the record back
    Read(IdArgs),
    /// Converge an existing record to a JSON file
    Update(UpdateArgs),
    /// Delete the record
    Delete(IdArgs),
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// List projects whose name matches the filter
    Search {
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand)]
enum LookupCommand {
    Ci(IdArgs),
    Project {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand)]
enum SchemaCommand {
    Ci,
    Project,
}

#[derive(clap::Args)]
struct FileArgs {
    /// Path to the desired-state JSON document
    #[arg(long)]
    file: PathBuf,
}

#[derive(clap::Args)]
struct IdArgs {
    #[arg(long)]
    id: String,
}

#[derive(clap::Args)]
struct UpdateArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Schema output needs neither configuration nor a session.
    if let Commands::Schema(which) = &cli.command {
        let schema = match which {
            SchemaCommand::Ci => ResourceSchema::ci(),
            SchemaCommand::Project => ResourceSchema::project(),
        };
        return emit(&schema);
    }

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    init_tracing(&config).context("initializing telemetry")?;
    if let Ok(redacted) = config.redacted_json() {
        tracing::debug!(config = %redacted, "Loaded configuration");
    }

    let session = Session::login(&config)
        .await
        .context("opening Idefix session")?;

    let context = TraceContext::new(operation_label(&cli.command));
    with_trace_context(context, run(cli.command, session)).await
}

async fn run(command: Commands, session: Session) -> Result<()> {
    info!(
        trace_id = ?current_trace_id(),
        operation = ?current_operation(),
        "Running operation"
    );

    match command {
        Commands::Ci(command) => {
            manage(&CiReconciler::new(), &ResourceSchema::ci(), &session, command).await
        }
        Commands::Project(command) => {
            manage(
                &ProjectReconciler::new(),
                &ResourceSchema::project(),
                &session,
                command,
            )
            .await
        }
        Commands::Projects(ProjectsCommand::Search { name }) => {
            let result = ProjectsQuery.search(&session, &name).await?;
            emit(&result)
        }
        Commands::Lookup(LookupCommand::Ci(IdArgs { id })) => {
            let details = CiLookup.read(&session, &id).await?;
            emit(&details)
        }
        Commands::Lookup(LookupCommand::Project { id }) => {
            let details = ProjectLookup.read(&session, id).await?;
            emit(&details)
        }
        Commands::Schema(_) => Ok(()),
    }
}

async fn manage<R>(
    reconciler: &R,
    schema: &ResourceSchema,
    session: &Session,
    command: ResourceCommand,
) -> Result<()>
where
    R: Reconciler,
    R::Desired: DeserializeOwned,
    R::State: Serialize,
{
    match command {
        ResourceCommand::Create(FileArgs { file }) => {
            let desired: R::Desired = load_desired(schema, &file).await?;
            let state = reconciler.create(session, &desired).await.map_err(|err| {
                if let Some(id) = err.orphaned_id() {
                    warn!(
                        id = %id,
                        kind = %reconciler.kind(),
                        "Remote record left in place after failed create"
                    );
                }
                err
            })?;
            emit(&state)
        }
        ResourceCommand::Read(IdArgs { id }) => match reconciler.read(session, &id).await? {
            ReadOutcome::Found(state) => emit(&state),
            ReadOutcome::Gone => emit(&Value::Null),
        },
        ResourceCommand::Update(UpdateArgs { id, file }) => {
            let desired: R::Desired = load_desired(schema, &file).await?;
            let state = reconciler.update(session, &id, &desired).await?;
            emit(&state)
        }
        ResourceCommand::Delete(IdArgs { id }) => {
            reconciler.delete(session, &id).await?;
            emit(&serde_json::json!({ "deleted": id }))
        }
    }
}

/// Read a desired-state document and fill the schema defaults before decoding.
async fn load_desired<T: DeserializeOwned>(schema: &ResourceSchema, path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let mut document: Value =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    let fields = document
        .as_object_mut()
        .with_context(|| format!("{} must contain a JSON object", path.display()))?;
    schema.apply_defaults(fields);

    serde_json::from_value(document)
        .with_context(|| format!("{} does not describe a valid {}", path.display(), schema.name))
}

fn emit<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{json}");
    Ok(())
}

fn operation_label(command: &Commands) -> String {
    let action = |command: &ResourceCommand| match command {
        ResourceCommand::Create(_) => "create",
        ResourceCommand::Read(_) => "read",
        ResourceCommand::Update(_) => "update",
        ResourceCommand::Delete(_) => "delete",
    };

    match command {
        Commands::Ci(command) => format!("ci.{}", action(command)),
        Commands::Project(command) => format!("project.{}", action(command)),
        Commands::Projects(_) => "projects.search".to_string(),
        Commands::Lookup(LookupCommand::Ci(_)) => "lookup.ci".to_string(),
        Commands::Lookup(LookupCommand::Project { .. }) => "lookup.project".to_string(),
        Commands::Schema(_) => "schema".to_string(),
    }
}
