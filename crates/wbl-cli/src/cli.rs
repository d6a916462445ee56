use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wbl_types::Category;

#[derive(Parser)]
#[command(
    name = "wbl",
    about = "WayBill Ledger: waybill records and their identifier indexes",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Ledger snapshot file
    #[arg(long, global = true, default_value = "wbl-state.json")]
    pub state: PathBuf,

    /// Chaincode configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Caller certificate attribute, repeatable
    #[arg(long = "attr", global = true, value_name = "NAME=VALUE")]
    pub attrs: Vec<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write an empty ledger snapshot
    Init(InitArgs),
    /// Invoke a chaincode operation
    Invoke(InvokeArgs),
    /// Print the identifier index of a category
    Index(IndexArgs),
    /// List the operations the chaincode accepts
    Operations,
}

#[derive(Args)]
pub struct InitArgs {
    /// Replace an existing snapshot
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct InvokeArgs {
    pub operation: String,
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct IndexArgs {
    /// waybill or masterWayBill
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_invoke() {
        let cli = Cli::try_parse_from(["wbl", "invoke", "CreateWayBill", "wb1", "{}"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert_eq!(args.operation, "CreateWayBill");
            assert_eq!(args.args, vec!["wb1", "{}"]);
        } else {
            panic!("wrong command");
        }
        assert_eq!(cli.state, PathBuf::from("wbl-state.json"));
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn parse_invoke_without_args() {
        let cli = Cli::try_parse_from(["wbl", "invoke", "GetWayBillIndex"]).unwrap();
        if let Command::Invoke(args) = cli.command {
            assert!(args.args.is_empty());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "wbl", "--state", "/tmp/s.json", "--attr", "role=writer", "--format", "json", "-v",
            "index", "masterWayBill",
        ])
        .unwrap();
        assert_eq!(cli.state, PathBuf::from("/tmp/s.json"));
        assert_eq!(cli.attrs, vec!["role=writer"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        if let Command::Index(args) = cli.command {
            assert_eq!(args.category, Category::MasterWayBill);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn unknown_category_rejected() {
        assert!(Cli::try_parse_from(["wbl", "index", "pallet"]).is_err());
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::try_parse_from(["wbl", "init", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::Init(InitArgs { force: true })));
    }
}
