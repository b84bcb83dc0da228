use ethereum_types::H256;

use crate::error::ValidationError;

/// Compare a locally computed hash or root against the one asserted by the
/// chain. Content must pass this before it is handed to the distributor.
pub fn validate_root(computed: H256, expected: H256, context: &str) -> Result<(), ValidationError> {
    if computed == expected {
        return Ok(());
    }
    tracing::debug!(context, ?computed, ?expected, "root mismatch");
    Err(ValidationError {
        context: context.to_string(),
        computed,
        expected,
    })
}
