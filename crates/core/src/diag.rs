//! Host-side termination policy for the diagnostic channel.
//!
//! The engine only reports. A host that wants to stop a misbehaving program
//! feeds drained diagnostics through an [`ErrorBudget`]: any fatal
//! diagnostic exhausts it at once, and otherwise it is exhausted when the
//! number of diagnostics recorded reaches the limit.

use crate::error::{Diagnostic, Severity};

/// Diagnostic count, of any severity, at which the budget is exhausted.
/// The 20th diagnostic stops the host, so 19 are tolerated.
pub const DEFAULT_ERROR_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetState {
    Ok,
    Exhausted,
}

#[derive(Debug, Clone)]
pub struct ErrorBudget {
    limit: u32,
    count: u32,
    fatal: bool,
}

impl ErrorBudget {
    pub fn new(limit: u32) -> Self {
        ErrorBudget { limit, count: 0, fatal: false }
    }

    pub fn record(&mut self, diag: &Diagnostic) -> BudgetState {
        self.count = self.count.saturating_add(1);
        if diag.severity == Severity::Fatal {
            self.fatal = true;
        }
        self.state()
    }

    pub fn state(&self) -> BudgetState {
        if self.fatal || self.count >= self.limit {
            BudgetState::Exhausted
        } else {
            BudgetState::Ok
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VmError;

    #[test]
    fn test_recoverable_until_limit() {
        let mut budget = ErrorBudget::new(3);
        let d = Diagnostic::new(&VmError::StackEmpty, 0);
        assert_eq!(budget.record(&d), BudgetState::Ok);
        assert_eq!(budget.record(&d), BudgetState::Ok);
        assert_eq!(budget.record(&d), BudgetState::Exhausted);
        assert_eq!(budget.count(), 3);
    }

    #[test]
    fn test_fatal_exhausts_immediately() {
        let mut budget = ErrorBudget::default();
        let d = Diagnostic::new(&VmError::TooManyBanks(6), 0);
        assert_eq!(budget.record(&d), BudgetState::Exhausted);
        assert_eq!(budget.limit(), DEFAULT_ERROR_LIMIT);
    }

    #[test]
    fn test_default_tolerates_nineteen() {
        let mut budget = ErrorBudget::default();
        let d = Diagnostic::new(&VmError::InvalidRegister(5), 0x10);
        for _ in 0..DEFAULT_ERROR_LIMIT - 1 {
            assert_eq!(budget.record(&d), BudgetState::Ok);
        }
        assert_eq!(budget.record(&d), BudgetState::Exhausted);
    }

    #[test]
    fn test_count_saturates() {
        let mut budget = ErrorBudget::new(u32::MAX);
        budget.count = u32::MAX - 1;
        let d = Diagnostic::new(&VmError::StackEmpty, 0);
        assert_eq!(budget.record(&d), BudgetState::Exhausted);
        assert_eq!(budget.record(&d), BudgetState::Exhausted);
        assert_eq!(budget.count(), u32::MAX);
    }
}
