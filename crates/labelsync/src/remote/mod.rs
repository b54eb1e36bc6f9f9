//! Remote collaborator traits and implementations
//!
//! The sync engine talks to the contacts directory and the mail settings
//! only through these traits. The Google clients implement them for real
//! accounts; the in-memory versions back the tests.

mod memory;
mod traits;

pub use memory::{InMemoryContacts, InMemoryMail};
pub use traits::{ContactsDirectory, MailSettings, NotFoundError, Page};
