//! Command abstractions.

/// Trait that all domain commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// The principal issuing the command. Empty for system-initiated work.
    fn actor_id(&self) -> &str;
}
