/// A rejected ledger operation. Every failure is terminal for the call that
/// raised it and leaves no partial mutation behind; the caller decides
/// whether to retry with corrected arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerError {
    /// Join: caller is already a participant.
    AlreadyMember,
    /// CreatePolicy: caller is not a participant.
    /// SubmitClaim: policy missing or caller is not its owner — absence and
    /// ownership mismatch are deliberately indistinguishable.
    Unauthorized,
    /// CreatePolicy: premium exceeds the funding oracle's answer.
    /// ApproveClaim: payout would overdraw the pool balance.
    InsufficientFunds,
    /// SubmitClaim: policy inactive or amount exceeds its coverage.
    InvalidPolicy,
    /// ApproveClaim: caller is not the administrator.
    OwnerOnly,
    /// ApproveClaim: no claim with that id.
    NotFound,
    /// ApproveClaim: claim was already paid out.
    AlreadyApproved,
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyMember => "already a participant",
            Self::Unauthorized => "caller not authorized",
            Self::InsufficientFunds => "insufficient funds",
            Self::InvalidPolicy => "policy inactive or amount exceeds coverage",
            Self::OwnerOnly => "administrator only",
            Self::NotFound => "no such claim",
            Self::AlreadyApproved => "claim already approved",
        };
        f.write_str(s)
    }
}

impl std::error::Error for LedgerError {}
