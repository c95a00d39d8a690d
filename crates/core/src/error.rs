//! Error kinds and the diagnostic payload raised to the host.
//!
//! Every condition the core can hit is a [`VmError`]. Recoverable ones are
//! raised while executing an instruction: the instruction is refused as a
//! whole and execution continues. Fatal ones come from host-facing load
//! calls and are returned to the caller, which decides whether to stop.

use serde::Serialize;
use thiserror::Error;

use crate::{BANK_SIZE, ROM_BANK_COUNT, STACK_LIMIT};

pub type Result<T> = std::result::Result<T, VmError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// JUMP attempted with the call stack already at its reserved limit.
    #[error("call stack has hit maximum depth ({depth}/{limit})", limit = STACK_LIMIT)]
    StackOverflow { depth: usize },

    /// RETURN with nothing on the call stack.
    #[error("stack has nothing to return with")]
    StackEmpty,

    #[error("invalid register id 0x{0:02X}")]
    InvalidRegister(u8),

    #[error("program image for bank {bank} is {len} bytes (max {max})", max = BANK_SIZE)]
    ImageTooLarge { bank: usize, len: usize },

    #[error("{0} bank images supplied (max {max})", max = ROM_BANK_COUNT)]
    TooManyBanks(usize),
}

impl VmError {
    pub fn severity(&self) -> Severity {
        match self {
            VmError::StackOverflow { .. } | VmError::StackEmpty | VmError::InvalidRegister(_) => {
                Severity::Recoverable
            }
            VmError::ImageTooLarge { .. } | VmError::TooManyBanks(_) => Severity::Fatal,
        }
    }
}

/// How bad a reported condition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Operation refused, execution continues.
    Recoverable,
    /// Outside the core's own scope; the host decides whether to halt.
    Fatal,
}

/// One event on the diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,
    /// Program counter of the instruction that raised it.
    pub pc: u8,
}

impl Diagnostic {
    pub fn new(err: &VmError, pc: u8) -> Self {
        Diagnostic { message: err.to_string(), severity: err.severity(), pc }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Recoverable => "warning",
            Severity::Fatal => "error",
        };
        write!(f, "{} @ 0x{:02X}: {}", tag, self.pc, self.message)
    }
}
