use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use reichelt::{CatalogClient, ClientConfig, NumberFormat};

mod lookup;

/// Reichelt catalog lookup
#[derive(Debug, Parser)]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub client: ClientArgs,
    /// When quiet no logs are outputted
    #[arg(long, short, global = true)]
    pub quiet: bool,
    #[command(subcommand)]
    pub cmd: SubCommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum SubCommand {
    #[command(name = "part")]
    Part(PartArgs),
    #[command(name = "search")]
    Search(SearchArgs),
    #[command(name = "datasheet")]
    Datasheet(DatasheetArgs),
    #[command(hide = true)]
    Completion,
}

#[derive(Debug, clap::Args)]
pub struct ClientArgs {
    /// Optional client yaml configuration file
    #[arg(env = "REICHELT_CONFIG", long, global = true)]
    pub config: Option<PathBuf>,
    /// Override the Accept-Language request header
    #[arg(long, global = true)]
    pub accept_language: Option<String>,
    /// Override the User-Agent request header
    #[arg(long, global = true)]
    pub user_agent: Option<String>,
    /// Override the decimal notation of displayed prices
    #[arg(value_enum, long, global = true)]
    pub number_format: Option<NumberFormat>,
}

impl TryFrom<&ClientArgs> for ClientConfig {
    type Error = anyhow::Error;

    fn try_from(args: &ClientArgs) -> Result<Self, Self::Error> {
        let mut conf = if let Some(path) = &args.config {
            let file = File::open(path)
                .with_context(|| format!("Couldn't open config {}", path.display()))?;
            ClientConfig::from_yaml_reader(file)?
        } else {
            ClientConfig::default()
        };
        if let Some(accept_language) = &args.accept_language {
            conf.accept_language = accept_language.to_string();
        }
        if let Some(user_agent) = &args.user_agent {
            conf.user_agent = Some(user_agent.to_string());
        }
        if let Some(number_format) = args.number_format {
            conf.number_format = number_format;
        }
        Ok(conf)
    }
}

/// Look up a part and print its details
#[derive(Debug, clap::Args)]
pub struct PartArgs {
    /// Exact part number, case doesn't matter
    pub part: String,
    /// Only print this attribute, searched anywhere in the record
    pub attribute: Option<String>,
}

pub fn part(client: &CatalogClient, args: PartArgs) -> anyhow::Result<ExitCode> {
    let Some(detail) = client.search_part(&args.part)? else {
        println!("Part not found");
        return Ok(ExitCode::FAILURE);
    };

    match args.attribute {
        None => println!("{}", serde_json::to_string_pretty(&detail)?),
        Some(key) => {
            let record = serde_json::to_value(&detail)?;
            match lookup::find_key(&record, &key) {
                Some(value) => lookup::render(value)
                    .into_iter()
                    .for_each(|line| println!("{line}")),
                None => {
                    println!("Key \"{key}\" not found.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Print every search result for a keyword
#[derive(Debug, clap::Args)]
pub struct SearchArgs {
    pub keyword: String,
}

pub fn search(client: &CatalogClient, args: SearchArgs) -> anyhow::Result<ExitCode> {
    let results = client.search_results(&args.keyword)?;
    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(ExitCode::SUCCESS)
}

/// Download the datasheet of a part
#[derive(Debug, clap::Args)]
pub struct DatasheetArgs {
    /// Exact part number, case doesn't matter
    pub part: String,
    /// Destination file, defaults to `<PART>.pdf`
    #[arg(long, short)]
    pub output: Option<PathBuf>,
    /// Which datasheet to download when the part has several
    #[arg(long, short, default_value_t = 0)]
    pub index: usize,
}

pub fn datasheet(client: &CatalogClient, args: DatasheetArgs) -> anyhow::Result<ExitCode> {
    let Some(detail) = client.search_part(&args.part)? else {
        println!("Part not found");
        return Ok(ExitCode::FAILURE);
    };
    let Some(url) = detail.datasheets.get(args.index) else {
        println!(
            "No datasheet #{} for {} ({} available)",
            args.index,
            detail.part,
            detail.datasheets.len()
        );
        return Ok(ExitCode::FAILURE);
    };

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}.pdf", args.part)));
    client.fetch_file(url, &output)?;
    println!("{}", output.display());

    Ok(ExitCode::SUCCESS)
}

fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    if !args.quiet {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("reichelt=warn"))
            .init();
    }

    if let SubCommand::Completion = args.cmd {
        generate(Shell::Bash, &mut Args::command(), "reichelt", &mut io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let client = CatalogClient::new((&args.client).try_into()?)?;
    log::debug!("Using {:?}", client.config());

    match args.cmd {
        SubCommand::Part(args) => part(&client, args),
        SubCommand::Search(args) => search(&client, args),
        SubCommand::Datasheet(args) => datasheet(&client, args),
        SubCommand::Completion => Ok(ExitCode::SUCCESS),
    }
}
