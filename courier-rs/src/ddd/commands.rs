//! Command type marker.

/// Command: named intent handled by exactly one [`CommandHandler`](super::CommandHandler).
/// `#[derive(Command)]` derives the name from the type in snake_case.
pub trait Command: Send {
    fn name() -> &'static str
    where
        Self: Sized;
}
