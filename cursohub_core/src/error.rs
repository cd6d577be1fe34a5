/// Logical error classes shared by every store service.
///
/// Each service keeps its own error enum; `kind()` on those enums maps into
/// this taxonomy so callers can pick a presentation without matching on
/// service-specific variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Uniqueness violation: duplicate email, invite-code collision,
    /// already-enrolled.
    Conflict,
    /// A referenced entity does not exist.
    NotFound,
    /// Structurally disallowed request: reply-to-a-reply, resolving a
    /// reply, expired or foreign reset token, reorder set mismatch.
    InvalidState,
    /// Caller lacks the role or ownership the operation requires.
    Unauthorized,
    /// Database failure. Never produced by a well-formed request.
    Internal,
}
