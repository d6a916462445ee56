use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::{json, Value};
use tracing::debug;
use wbl_chaincode::{
    Chaincode, ChaincodeConfig, DispatchError, Operation, OperationKind, StaticAttributes,
    OPERATIONS,
};
use wbl_ledger::{InMemoryLedger, LedgerSnapshot, StateLock};
use wbl_types::Category;

use crate::cli::*;

const NO_ARGS: &[&str] = &[];

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Init(args) => cmd_init(&cli, args),
        Command::Invoke(args) => cmd_invoke(&cli, args),
        Command::Index(args) => cmd_index(&cli, args),
        Command::Operations => cmd_operations(&cli),
    }
}

/// A chaincode bound to the ledger loaded from `--state`.
///
/// A host that will save holds the state lock from before the load until it
/// is dropped, so overlapping writers cannot overwrite each other's saves.
struct Host {
    ledger: Arc<InMemoryLedger>,
    chaincode: Chaincode,
    lock: Option<StateLock>,
}

impl Host {
    fn open(
        cli: &Cli,
        snapshot: &LedgerSnapshot,
        lock: Option<StateLock>,
    ) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => ChaincodeConfig::load(path)?,
            None => ChaincodeConfig::default(),
        };
        let attrs = StaticAttributes::parse_pairs(&cli.attrs)?;
        let ledger = Arc::new(InMemoryLedger::from_snapshot(snapshot)?);
        let capability = config.access.build(Arc::new(attrs));
        let chaincode = Chaincode::new(ledger.clone(), config).with_capability(capability);
        let entries = ledger.len()?;
        debug!(entries, locked = lock.is_some(), "ledger loaded");
        Ok(Self {
            ledger,
            chaincode,
            lock,
        })
    }

    /// Load for reading only. Saving such a host is refused.
    fn load(cli: &Cli) -> anyhow::Result<Self> {
        Self::open(cli, &load_snapshot(cli)?, None)
    }

    /// Lock the state, then load it.
    fn load_for_write(cli: &Cli) -> anyhow::Result<Self> {
        let lock = lock_state(cli)?;
        Self::open(cli, &load_snapshot(cli)?, Some(lock))
    }

    fn save(&self, cli: &Cli) -> anyhow::Result<()> {
        if self.lock.is_none() {
            bail!("refusing to save {} without holding its lock", cli.state.display());
        }
        self.ledger
            .snapshot()
            .and_then(|s| s.save(&cli.state))
            .with_context(|| format!("cannot save ledger state to {}", cli.state.display()))?;
        let entries = self.ledger.len()?;
        debug!(state = %cli.state.display(), entries, "ledger saved");
        Ok(())
    }

    fn invoke(&self, op: Operation) -> anyhow::Result<Option<Vec<u8>>> {
        let name = op.name();
        self.chaincode.invoke_parsed(op).map_err(|e| failed(name, e))
    }
}

fn lock_state(cli: &Cli) -> anyhow::Result<StateLock> {
    StateLock::acquire(&cli.state).with_context(|| {
        format!(
            "another wbl run is using {}; if none is, remove {}",
            cli.state.display(),
            StateLock::path_for(&cli.state).display()
        )
    })
}

fn load_snapshot(cli: &Cli) -> anyhow::Result<LedgerSnapshot> {
    LedgerSnapshot::load(&cli.state)
        .with_context(|| format!("cannot load ledger state from {}", cli.state.display()))
}

fn parse(name: &str, args: &[impl AsRef<str>]) -> anyhow::Result<Operation> {
    Operation::parse(name, args).map_err(|e| failed(name, e))
}

fn failed(operation: &str, e: DispatchError) -> anyhow::Error {
    let kind = e.kind();
    anyhow::Error::new(e).context(format!("{operation} failed [{kind}]"))
}

fn cmd_init(cli: &Cli, args: &InitArgs) -> anyhow::Result<()> {
    let lock = lock_state(cli)?;
    if cli.state.exists() && !args.force {
        bail!("{} already exists (use --force to replace it)", cli.state.display());
    }
    let host = Host::open(cli, &LedgerSnapshot::empty(), Some(lock))?;
    host.invoke(Operation::Init)?;
    host.save(cli)?;
    match cli.format {
        OutputFormat::Json => println!("{}", json!({ "initialized": cli.state })),
        OutputFormat::Text => println!(
            "{} Initialized empty ledger in {}",
            "✓".green().bold(),
            cli.state.display().to_string().bold()
        ),
    }
    Ok(())
}

fn cmd_invoke(cli: &Cli, args: &InvokeArgs) -> anyhow::Result<()> {
    let op = parse(&args.operation, &args.args)?;
    let writes = !op.is_read_only();
    let host = if writes {
        Host::load_for_write(cli)?
    } else {
        Host::load(cli)?
    };
    let result = host.invoke(op);

    // A create can fail after its record is written; keep what the ledger holds.
    if writes {
        host.save(cli)?;
    }
    let payload = result?;

    match cli.format {
        OutputFormat::Json => {
            let value = payload.as_deref().map(payload_value).unwrap_or(Value::Null);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "operation": args.operation,
                    "payload": value,
                }))?
            );
        }
        OutputFormat::Text => match payload {
            Some(bytes) => println!("{}", String::from_utf8_lossy(&bytes)),
            None => println!("{} {}", "✓".green().bold(), args.operation.bold()),
        },
    }
    Ok(())
}

fn cmd_index(cli: &Cli, args: &IndexArgs) -> anyhow::Result<()> {
    let name = listing_operation(args.category)?;
    let host = Host::load(cli)?;
    let payload = host.invoke(parse(name, NO_ARGS)?)?.unwrap_or_default();
    let ids: Vec<String> = serde_json::from_slice(&payload)
        .with_context(|| format!("{name} returned a malformed index"))?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ids)?),
        OutputFormat::Text => {
            println!("{} index: {} entries", args.category.to_string().bold(), ids.len());
            for id in &ids {
                println!("  {}", id.yellow());
            }
        }
    }
    Ok(())
}

fn cmd_operations(cli: &Cli) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => {
            let ops: Vec<Value> = OPERATIONS
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "category": spec.category.map(|c| c.name()),
                        "arity": spec.arity.to_string(),
                        "usage": spec.usage(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&ops)?);
        }
        OutputFormat::Text => {
            for spec in OPERATIONS {
                println!("  {:<24} {}", spec.name.cyan(), spec.usage().dimmed());
            }
        }
    }
    Ok(())
}

fn listing_operation(category: Category) -> anyhow::Result<&'static str> {
    OPERATIONS
        .iter()
        .find(|spec| spec.kind == OperationKind::ListIndex && spec.category == Some(category))
        .map(|spec| spec.name)
        .with_context(|| format!("no index listing for {category}"))
}

/// JSON payloads are embedded as-is; anything else as a string.
fn payload_value(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
