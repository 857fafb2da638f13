//! Named operations and positional invocation
//!
//! Ledger clients call the contract by function name with a list of string
//! arguments. Structured arguments (`permissions`, `components`) travel as
//! JSON text. This module parses the name, decodes the arguments and runs
//! the matching [`DppContract`] method.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::contract::DppContract;
use crate::crypto::SignedEnvelope;
use crate::error::{PassportError, Result};
use crate::ledger::LedgerStore;
use crate::types::{Dpp, DppFields, Permissions};

/// The transaction API surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Exists,
    Create,
    Read,
    Update,
    Delete,
    Transfer,
    CreateWithSignature,
    UpdateWithSignature,
    TransferWithSignature,
    ListAll,
    ListByOwner,
}

impl Operation {
    /// Every operation, in declaration order
    pub const ALL: [Operation; 11] = [
        Operation::Exists,
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
        Operation::Transfer,
        Operation::CreateWithSignature,
        Operation::UpdateWithSignature,
        Operation::TransferWithSignature,
        Operation::ListAll,
        Operation::ListByOwner,
    ];

    /// Canonical function name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Exists => "Exists",
            Operation::Create => "Create",
            Operation::Read => "Read",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
            Operation::Transfer => "Transfer",
            Operation::CreateWithSignature => "CreateWithSignature",
            Operation::UpdateWithSignature => "UpdateWithSignature",
            Operation::TransferWithSignature => "TransferWithSignature",
            Operation::ListAll => "ListAll",
            Operation::ListByOwner => "ListByOwner",
        }
    }

    /// Function name used by earlier chaincode clients
    pub fn legacy_name(&self) -> &'static str {
        match self {
            Operation::Exists => "DPPExists",
            Operation::Create => "CreateDPP",
            Operation::Read => "ReadDPP",
            Operation::Update => "UpdateDPP",
            Operation::Delete => "DeleteDPP",
            Operation::Transfer => "TransferDPP",
            Operation::CreateWithSignature => "CreateDPPWithSignature",
            Operation::UpdateWithSignature => "UpdateDPPWithSignature",
            Operation::TransferWithSignature => "TransferDPPWithSignature",
            Operation::ListAll => "GetAllDPPs",
            Operation::ListByOwner => "GetAllDPPsByOwnerDID",
        }
    }

    /// True when the operation writes world state (submit, not evaluate)
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Operation::Exists | Operation::Read | Operation::ListAll | Operation::ListByOwner
        )
    }

    /// True for the variants that carry a signature envelope
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            Operation::CreateWithSignature
                | Operation::UpdateWithSignature
                | Operation::TransferWithSignature
        )
    }

    /// Number of positional arguments
    pub fn arity(&self) -> usize {
        match self {
            Operation::ListAll => 0,
            Operation::Exists | Operation::Read | Operation::Delete | Operation::ListByOwner => 1,
            Operation::Transfer => 2,
            Operation::TransferWithSignature => 5,
            Operation::Create | Operation::Update => 7,
            Operation::CreateWithSignature | Operation::UpdateWithSignature => 10,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = PassportError;

    fn from_str(s: &str) -> Result<Self> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s || op.legacy_name() == s)
            .ok_or_else(|| PassportError::Malformed(format!("unknown function '{}'", s)))
    }
}

/// A call by function name with positional string arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new<I, S>(function: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            function: function.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Resolve the function name and check the argument count
    pub fn operation(&self) -> Result<Operation> {
        let operation: Operation = self.function.parse()?;
        if self.args.len() != operation.arity() {
            return Err(PassportError::Malformed(format!(
                "{} expects {} arguments, got {}",
                operation,
                operation.arity(),
                self.args.len()
            )));
        }
        Ok(operation)
    }
}

/// Value returned by an invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InvocationResult {
    Bool(bool),
    Record(Box<Dpp>),
    Records(Vec<Dpp>),
    Unit,
}

impl InvocationResult {
    /// JSON payload as returned to ledger clients
    pub fn to_json(&self) -> Result<serde_json::Value> {
        match self {
            InvocationResult::Unit => Ok(serde_json::Value::Null),
            other => serde_json::to_value(other).map_err(PassportError::from),
        }
    }
}

impl DppContract {
    /// Run a named invocation inside the current transaction
    pub fn invoke<S>(&self, ledger: &mut S, invocation: &Invocation) -> Result<InvocationResult>
    where
        S: LedgerStore + ?Sized,
    {
        let operation = invocation.operation()?;
        let args = invocation.args.as_slice();

        let result = match operation {
            Operation::Exists | Operation::Read | Operation::ListAll | Operation::ListByOwner => {
                self.evaluate(&*ledger, invocation)?
            }
            Operation::Create => {
                let fields = decode_fields(&args[1..7])?;
                InvocationResult::Record(Box::new(self.create(ledger, &args[0], fields)?))
            }
            Operation::Update => {
                let fields = decode_fields(&args[1..7])?;
                InvocationResult::Record(Box::new(self.update(ledger, &args[0], fields)?))
            }
            Operation::Delete => {
                self.delete(ledger, &args[0])?;
                InvocationResult::Unit
            }
            Operation::Transfer => {
                InvocationResult::Record(Box::new(self.transfer(ledger, &args[0], &args[1])?))
            }
            Operation::CreateWithSignature => {
                let fields = decode_fields(&args[1..7])?;
                let envelope = decode_envelope(&args[7..10]);
                InvocationResult::Record(Box::new(self.create_with_signature(
                    ledger, &args[0], fields, &envelope,
                )?))
            }
            Operation::UpdateWithSignature => {
                let fields = decode_fields(&args[1..7])?;
                let envelope = decode_envelope(&args[7..10]);
                InvocationResult::Record(Box::new(self.update_with_signature(
                    ledger, &args[0], fields, &envelope,
                )?))
            }
            Operation::TransferWithSignature => {
                let envelope = decode_envelope(&args[2..5]);
                InvocationResult::Record(Box::new(self.transfer_with_signature(
                    ledger, &args[0], &args[1], &envelope,
                )?))
            }
        };

        Ok(result)
    }

    /// Run a read-only invocation; mutating operations are refused
    pub fn evaluate<S>(&self, ledger: &S, invocation: &Invocation) -> Result<InvocationResult>
    where
        S: LedgerStore + ?Sized,
    {
        let operation = invocation.operation()?;
        let args = invocation.args.as_slice();

        match operation {
            Operation::Exists => Ok(InvocationResult::Bool(self.exists(ledger, &args[0])?)),
            Operation::Read => Ok(InvocationResult::Record(Box::new(
                self.read(ledger, &args[0])?,
            ))),
            Operation::ListAll => Ok(InvocationResult::Records(self.list_all(ledger)?)),
            Operation::ListByOwner => Ok(InvocationResult::Records(
                self.list_by_owner(ledger, &args[0])?,
            )),
            mutating => Err(PassportError::Malformed(format!(
                "{} modifies state and must be submitted",
                mutating
            ))),
        }
    }
}

/// `owner_did, serial_number, status, permissions_json, product_name, components_json`
fn decode_fields(args: &[String]) -> Result<DppFields> {
    let permissions = decode_json_arg::<Permissions>("permissions", &args[3])?;
    let components = decode_json_arg::<Vec<String>>("components", &args[5])?;

    Ok(DppFields {
        owner_did: args[0].clone(),
        serial_number: args[1].clone(),
        status: args[2].clone(),
        permissions,
        product_name: args[4].clone(),
        components,
    })
}

/// `original_message, signed_base64, public_key_base64`
fn decode_envelope(args: &[String]) -> SignedEnvelope {
    SignedEnvelope::new(args[0].clone(), args[1].clone(), args[2].clone())
}

/// Empty text and JSON `null` decode as the empty value
fn decode_json_arg<T>(name: &str, raw: &str) -> Result<T>
where
    T: Default + serde::de::DeserializeOwned,
{
    if raw.trim().is_empty() {
        return Ok(T::default());
    }
    let value: Option<T> = serde_json::from_str(raw)
        .map_err(|e| PassportError::Malformed(format!("invalid {} argument: {}", name, e)))?;
    Ok(value.unwrap_or_default())
}
