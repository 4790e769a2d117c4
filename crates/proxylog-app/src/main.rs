use std::path::PathBuf;

use clap::{Parser, Subcommand};
use proxylog::{FieldSet, Repository, Service};
use proxylog_core::version;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
#[command(disable_version_flag = true)]
struct Args {
	/// Config file path. Missing file falls back to all-default config.
	#[arg(short, long, value_name = "file", env = "PROXYLOG_CONFIG")]
	config: Option<PathBuf>,

	/// Print version and exit.
	#[arg(short = 'V', long = "version")]
	version: bool,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Load and validate the config file, then exit.
	Validate,
	/// List logged requests, most recent first.
	List {
		/// Free-form filter expression, e.g. `method:post header:X-Trace`.
		#[arg(short, long, default_value = "")]
		filter: String,
	},
	/// Show one request (and its response, if any) by id.
	Show {
		/// The id printed by `list`.
		id: String,
	},
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if args.version {
		println!("{}", version::BuildInfo::default().version);
		return Ok(());
	}

	let config_path = args
		.config
		.unwrap_or_else(|| PathBuf::from("proxylog.yaml"));
	let config = proxylog::config::load(&config_path)?;
	proxylog_core::logging::init(&config.logging)?;

	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()?
		.block_on(run(config, args.command.unwrap_or(Command::List {
			filter: String::new(),
		})))
}

async fn run(config: proxylog::config::Config, command: Command) -> anyhow::Result<()> {
	info!(version = %version::BuildInfo::default().version, "starting");

	if matches!(command, Command::Validate) {
		println!("configuration is valid");
		return Ok(());
	}

	let repository = Repository::open(&config.store_path, config.pool_size)?;
	let service = Service::new(repository, config.scope);

	match command {
		Command::Validate => unreachable!("handled above"),
		Command::List { filter } => {
			let rows = service
				.find_all_requests(&filter, FieldSet::all(), CancellationToken::new())
				.await?;
			for row in &rows {
				println!("{} {} {}", row.id, row.method, row.url);
			}
		},
		Command::Show { id } => {
			let id = service.resolve_id(&id)?;
			let row = service
				.find_request_by_id(id, FieldSet::all(), CancellationToken::new())
				.await?;
			println!("{}", serde_json::to_string_pretty(&row)?);
		},
	}
	Ok(())
}
