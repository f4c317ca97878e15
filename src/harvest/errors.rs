//! Contract error classification
//!
//! Soroban surfaces contract failures as diagnostic strings containing an
//! `Error(Contract, #<code>)` marker. This module extracts the code and maps
//! it to the yield controller's error table so operators see a cause instead
//! of a raw diagnostic dump.

/// Yield controller error table. Codes below 1000 are the contract kit's
/// built-in errors; 1000+ are controller specific.
const CONTRACT_ERRORS: &[(u32, &str)] = &[
    (1, "Internal contract error"),
    (3, "Contract already initialized"),
    (4, "Unauthorized: caller lacks the required role"),
    (8, "Negative amount supplied"),
    (10, "Insufficient balance for this operation"),
    (12, "Arithmetic overflow in contract computation"),
    (1000, "Asset is not supported by the yield controller"),
    (1001, "Yield is not currently available for distribution"),
    (1002, "No pending harvest exists for this protocol and asset"),
    (1003, "A harvest is already in progress for this protocol and asset"),
    (1004, "Invalid harvest state for this operation."),
    (1005, "No yield available to harvest at this time."),
];

/// Extract the numeric contract error code from arbitrary error text.
/// Returns None when no `Error(Contract, #<code>)` marker is present.
pub fn extract_contract_code(message: &str) -> Option<u32> {
    let marker = "Error(Contract, #";
    let start = message.find(marker)? + marker.len();
    let rest = &message[start..];
    let end = rest.find(')')?;
    rest[..end].trim().parse().ok()
}

/// Map a contract error code to its human-readable cause
pub fn describe_contract_code(code: u32) -> Option<&'static str> {
    CONTRACT_ERRORS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, msg)| *msg)
}

/// Classify arbitrary error text. Returns the human-readable cause when the
/// text carries a recognized contract error code, None otherwise. Never
/// panics; callers fall back to logging the raw error.
pub fn classify(message: &str) -> Option<&'static str> {
    extract_contract_code(message).and_then(describe_contract_code)
}
