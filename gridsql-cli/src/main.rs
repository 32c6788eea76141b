//! gridsql command-line front end.
//!
//! Shows the SQL a listing request would produce for a field registry, and
//! optionally runs it against a SQLite file.
//!
//! ```bash
//! gridsql compose --fields fields.toml \
//!     --base "select * from users" --count "select count(*) from users" \
//!     --query 'sorts=[{"field":"name","dir":"asc"}]&take=10'
//!
//! gridsql run --db app.sqlite --fields fields.toml \
//!     --base "select * from users" --count "select count(*) from users" \
//!     --query 'filters=[{"field":"age","operator":"gt","value":30}]'
//! ```
//!
//! Exit status: 0 on success, 2 when the request is rejected, 1 otherwise.

mod output;
mod registry_file;
mod sqlite;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gridsql::prelude::*;
use gridsql::env;
use registry_file::RegistryFile;
use serde_json::{Value as JsonValue, json};
use sqlite::SqliteDb;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gridsql")]
#[command(about = "Compose allowlisted listing queries from request parameters")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the composed row and count queries as JSON
    Compose {
        #[command(flatten)]
        request: Request,

        /// Placeholder style
        #[arg(long, value_enum, default_value_t = DialectArg::Postgres)]
        dialect: DialectArg,
    },

    /// Run the composed queries against a SQLite database and print the page
    Run {
        #[command(flatten)]
        request: Request,

        /// SQLite database file (opened read-only)
        #[arg(long, value_name = "PATH")]
        db: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Request {
    /// Field registry file (TOML)
    #[arg(long, value_name = "PATH")]
    fields: PathBuf,

    /// Base row query
    #[arg(long, value_name = "SQL")]
    base: String,

    /// Base count query
    #[arg(long, value_name = "SQL")]
    count: Option<String>,

    /// Request query string, e.g. `sorts=...&take=10`
    #[arg(long, default_value = "")]
    query: String,

    /// Page size ceiling. Precedence: this flag, then the registry file's
    /// `take_limit`, then GRIDSQL_TAKE_LIMIT
    #[arg(long, value_name = "N")]
    take_limit: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectArg {
    Postgres,
    Sqlite,
    Mysql,
    Sqlserver,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(body) => {
            println!("{body:#}");
            ExitCode::SUCCESS
        },
        Err(err) => ExitCode::from(report(&err)),
    }
}

fn run(cli: Cli) -> Result<JsonValue> {
    match cli.command {
        Command::Compose { request, dialect } => match dialect {
            DialectArg::Postgres => compose_request(&request, Postgres),
            DialectArg::Sqlite => compose_request(&request, Sqlite),
            DialectArg::Mysql => compose_request(&request, MySql),
            DialectArg::Sqlserver => compose_request(&request, SqlServer),
        },
        Command::Run { request, db } => run_request(&request, &db),
    }
}

/// Everything a request needs besides the dialect.
struct Prepared {
    registry: FieldRegistry,
    params: QueryParams,
    names: ParamConfig,
    env: Vec<(String, String)>,
    take_limit: Option<u64>,
}

impl Prepared {
    fn load(request: &Request) -> Result<Self> {
        let file = RegistryFile::load(&request.fields)?;
        let params = QueryParams::parse(&request.query).map_err(Error::from)?;
        let env = env::snapshot();
        let registry = file.registry();
        info!(fields = ?registry.names(), params = params.len(), "loaded request");

        Ok(Self {
            registry,
            params,
            names: ParamConfig::from_env(&env),
            take_limit: request.take_limit.or(file.take_limit),
            env,
        })
    }

    fn config<D: Dialect>(&self, dialect: D) -> QueryConfig<D> {
        let config = QueryConfig::new(dialect).from_env(&self.env);
        match self.take_limit {
            Some(limit) => config.take_limit(limit),
            None => config,
        }
    }
}

fn compose_request<D: Dialect>(request: &Request, dialect: D) -> Result<JsonValue> {
    let prepared = Prepared::load(request)?;
    let config = prepared.config(dialect);
    let criteria = decode_criteria(&prepared.params, &prepared.names, config.take_ceiling())
        .map_err(Error::from)?;
    debug!(?criteria, "decoded criteria");

    let rows = compose(&request.base, &[], &criteria, &prepared.registry, &config, QueryKind::Select)
        .map_err(Error::from)?;
    let mut body = json!({
        "dialect": dialect.name(),
        "query": output::query(&rows),
    });

    if let Some(count) = &request.count {
        let count = compose(count, &[], &criteria, &prepared.registry, &config, QueryKind::Count)
            .map_err(Error::from)?;
        body["count_query"] = output::query(&count);
    }
    Ok(body)
}

fn run_request(request: &Request, db: &std::path::Path) -> Result<JsonValue> {
    let count_query = request
        .count
        .as_deref()
        .context("`run` needs --count to compute the total")?;
    let prepared = Prepared::load(request)?;
    let config = prepared.config(Sqlite);
    let mut db = SqliteDb::open(db).with_context(|| format!("failed to open {}", db.display()))?;

    let page = build_and_run(
        ListQuery::new(&request.base, count_query),
        &prepared.registry,
        &prepared.params,
        &prepared.names,
        &config,
        &mut db,
    )?;
    Ok(output::page(&page))
}

/// Print the failure and pick the exit status.
fn report(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_client_fault() => {
            println!("{:#}", output::fault(e));
            2
        },
        Some(e) => {
            let cause = std::error::Error::source(e).map(ToString::to_string).unwrap_or_default();
            eprintln!("error: {e}: {cause}");
            1
        },
        None => {
            eprintln!("error: {err:#}");
            1
        },
    }
}
