//! Named-operation entry points.
//!
//! Callers that only have an operation name and positional string arguments
//! route them through [`Ledger::execute`], [`Ledger::invoke`] or
//! [`Ledger::query`]. Results come back as raw bytes; operations without a
//! result body return `None`.

use std::fmt;

use log::debug;

use crate::error::{LedgerError, Result};
use crate::event::Event;
use crate::ledger::Ledger;
use crate::store::KvStore;
use crate::transaction::Transaction;

/// Operations reachable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Init,
    Write,
    Read,
    AppendEvent,
    AppendTransaction,
    Timeline,
    InsuranceEvents,
}

/// Whether an operation changes stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Mutation,
    Query,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Init,
        Operation::Write,
        Operation::Read,
        Operation::AppendEvent,
        Operation::AppendTransaction,
        Operation::Timeline,
        Operation::InsuranceEvents,
    ];

    /// Resolve an operation name, including its legacy aliases.
    ///
    /// ```
    /// use carledger::Operation;
    ///
    /// assert_eq!(Operation::parse("PutEvent").unwrap(), Operation::AppendEvent);
    /// assert_eq!(Operation::parse("insurance-events").unwrap(), Operation::InsuranceEvents);
    /// assert!(Operation::parse("delete_event").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let op = match name {
            "init" => Operation::Init,
            "write" => Operation::Write,
            "read" => Operation::Read,
            "append_event" | "PutEvent" => Operation::AppendEvent,
            "append_transaction" | "init_transaction" => Operation::AppendTransaction,
            "timeline" | "GetTimeline" => Operation::Timeline,
            "insurance_events" | "insurance-events" | "GetInsuranceEvent" => {
                Operation::InsuranceEvents
            }
            _ => return Err(LedgerError::UnknownOperation(name.to_string())),
        };
        Ok(op)
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Init => "init",
            Operation::Write => "write",
            Operation::Read => "read",
            Operation::AppendEvent => "append_event",
            Operation::AppendTransaction => "append_transaction",
            Operation::Timeline => "timeline",
            Operation::InsuranceEvents => "insurance_events",
        }
    }

    /// Number of positional arguments the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Operation::Init | Operation::Read | Operation::Timeline | Operation::InsuranceEvents => 1,
            Operation::Write => 2,
            Operation::AppendEvent | Operation::AppendTransaction => 8,
        }
    }

    pub fn kind(self) -> OperationKind {
        match self {
            Operation::Init
            | Operation::Write
            | Operation::AppendEvent
            | Operation::AppendTransaction => OperationKind::Mutation,
            Operation::Read | Operation::Timeline | Operation::InsuranceEvents => {
                OperationKind::Query
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl<S: KvStore> Ledger<S> {
    /// Run the operation called `name` with positional `args`.
    ///
    /// Arity is checked before the store is touched, so a call with the
    /// wrong number of arguments never mutates anything.
    ///
    /// ```
    /// use carledger::{Ledger, MemoryStore};
    ///
    /// let ledger = Ledger::new(MemoryStore::new());
    /// ledger.execute("init", &["0"]).unwrap();
    /// ledger
    ///     .execute("PutEvent", &["e1", "car1", "bob", "2024-01-01", "loc", "img", "desc", "dev1|dev2"])
    ///     .unwrap();
    ///
    /// let body = ledger.execute("timeline", &["car1"]).unwrap().unwrap();
    /// assert!(String::from_utf8(body).unwrap().contains(r#""iot":"dev1|dev2""#));
    /// ```
    pub fn execute<A: AsRef<str>>(&self, name: &str, args: &[A]) -> Result<Option<Vec<u8>>> {
        let op = Operation::parse(name)?;
        self.run(op, args)
    }

    /// Like [`Ledger::execute`], restricted to operations that change state.
    /// Queries are reported as unknown operations.
    pub fn invoke<A: AsRef<str>>(&self, name: &str, args: &[A]) -> Result<Option<Vec<u8>>> {
        self.execute_kind(OperationKind::Mutation, name, args)
    }

    /// Like [`Ledger::execute`], restricted to read-only operations.
    /// Mutations are reported as unknown operations.
    pub fn query<A: AsRef<str>>(&self, name: &str, args: &[A]) -> Result<Option<Vec<u8>>> {
        self.execute_kind(OperationKind::Query, name, args)
    }

    fn execute_kind<A: AsRef<str>>(
        &self,
        kind: OperationKind,
        name: &str,
        args: &[A],
    ) -> Result<Option<Vec<u8>>> {
        match Operation::parse(name) {
            Ok(op) if op.kind() == kind => self.run(op, args),
            _ => {
                debug!("{kind:?} entry point did not find operation '{name}'");
                Err(LedgerError::UnknownOperation(name.to_string()))
            }
        }
    }

    fn run<A: AsRef<str>>(&self, op: Operation, args: &[A]) -> Result<Option<Vec<u8>>> {
        if args.len() != op.arity() {
            return Err(LedgerError::arity(op.name(), op.arity(), args.len()));
        }
        debug!("running {op}");

        match op {
            Operation::Init => {
                self.init(args[0].as_ref())?;
                Ok(None)
            }
            Operation::Write => {
                self.raw().write(args[0].as_ref(), args[1].as_ref().as_bytes())?;
                Ok(None)
            }
            Operation::Read => self.raw().read(args[0].as_ref()).map(Some),
            Operation::AppendEvent => {
                self.append_event(Event::from_args(owned_args(args)))?;
                Ok(None)
            }
            Operation::AppendTransaction => {
                self.append_transaction(Transaction::from_args(owned_args(args)))?;
                Ok(None)
            }
            Operation::Timeline => self.events().timeline(args[0].as_ref()).map(Some),
            Operation::InsuranceEvents => self.events().insurance_events(args[0].as_ref()).map(Some),
        }
    }
}

/// Copy exactly `N` arguments; arity was checked by the caller.
fn owned_args<A: AsRef<str>, const N: usize>(args: &[A]) -> [String; N] {
    std::array::from_fn(|i| args[i].as_ref().to_string())
}
