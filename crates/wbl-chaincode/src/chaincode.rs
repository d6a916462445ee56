//! The dispatcher.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use wbl_index::{IndexError, IndexMaintainer};
use wbl_ledger::Ledger;
use wbl_store::RecordStore;
use wbl_types::{Category, Identifier, WayBillDocument};

use crate::capability::{AllowAll, CapabilityCheck};
use crate::config::ChaincodeConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::operation::Operation;

/// Routes named invocations to the record store and index maintainer.
///
/// A `Chaincode` is cheap to share across threads; concurrent creates are
/// serialized only by the index maintainer's compare-and-swap loop.
#[derive(Clone)]
pub struct Chaincode {
    store: RecordStore,
    index: IndexMaintainer,
    capability: Arc<dyn CapabilityCheck>,
    config: ChaincodeConfig,
}

impl Chaincode {
    /// A chaincode that lets every caller do everything.
    pub fn new(ledger: Arc<dyn Ledger>, config: ChaincodeConfig) -> Self {
        let store = RecordStore::new(ledger);
        let index = IndexMaintainer::new(store.clone(), config.index.clone());
        Self {
            store,
            index,
            capability: Arc::new(AllowAll),
            config,
        }
    }

    pub fn with_capability(mut self, capability: Arc<dyn CapabilityCheck>) -> Self {
        self.capability = capability;
        self
    }

    pub fn config(&self) -> &ChaincodeConfig {
        &self.config
    }

    /// Execute the operation `name` with `args`.
    ///
    /// `Get*` and the index listings return a payload; `Create*` and `Init`
    /// return `None`. Arguments are fully validated and the capability check
    /// passes before the ledger is touched.
    pub fn invoke<S: AsRef<str>>(
        &self,
        name: &str,
        args: &[S],
    ) -> DispatchResult<Option<Vec<u8>>> {
        let op = Operation::parse(name, args)?;
        self.invoke_parsed(op)
    }

    /// Execute an operation the caller has already parsed.
    pub fn invoke_parsed(&self, op: Operation) -> DispatchResult<Option<Vec<u8>>> {
        let name = op.name();
        let action = op.action();
        if !self.capability.authorize(&action)? {
            return Err(DispatchError::Unauthorized(format!("{name} requires {action}")));
        }

        if self.config.validate_documents {
            if let Operation::Create { id, blob, .. } = &op {
                validate_document(name, id, blob)?;
            }
        }

        debug!(operation = name, "dispatching");
        self.execute(op)
    }

    fn execute(&self, op: Operation) -> DispatchResult<Option<Vec<u8>>> {
        match op {
            Operation::Init => Ok(None),
            Operation::Create { category, id, blob } => {
                self.create(category, &id, &blob)?;
                Ok(None)
            }
            Operation::Get { id, .. } => Ok(Some(self.store.get(&id)?)),
            Operation::ListIndex { category } => Ok(Some(self.list(category)?)),
        }
    }

    fn create(&self, category: Category, id: &Identifier, blob: &[u8]) -> DispatchResult<()> {
        self.store.put(id, blob)?;
        if let Err(e) = self.index.register(category, id) {
            // The record stays written; only the index entry is missing.
            warn!(%category, %id, error = %e, "record stored but not indexed");
            return Err(e.into());
        }
        info!(%category, %id, bytes = blob.len(), "record created");
        Ok(())
    }

    fn list(&self, category: Category) -> DispatchResult<Vec<u8>> {
        let ids = self.index.identifiers(category)?;
        serde_json::to_vec(&ids).map_err(|e| {
            DispatchError::Index(IndexError::IndexReadFailed {
                category,
                reason: e.to_string(),
            })
        })
    }
}

fn validate_document(operation: &str, id: &Identifier, blob: &[u8]) -> DispatchResult<()> {
    let doc = WayBillDocument::from_json(blob)
        .map_err(|e| DispatchError::invalid(operation, e.to_string()))?;
    match doc.embedded_id() {
        Some(embedded) if embedded != id.as_str() => Err(DispatchError::invalid(
            operation,
            format!("document wayBillID {embedded} does not match identifier {id}"),
        )),
        _ => Ok(()),
    }
}

impl fmt::Debug for Chaincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chaincode")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
