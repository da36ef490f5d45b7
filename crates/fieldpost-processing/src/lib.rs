//! Fieldpost Processing Library
//!
//! Attachment-side logic of the report service: classifying files by name,
//! selecting which images fit the inline-delivery budget, and concatenating
//! text attachments into a single combined artifact.

pub mod budget;
pub mod classify;
pub mod combine;

pub use budget::{AttachmentCandidate, BudgetOutcome, EmbedBudget};
pub use classify::classify;
pub use combine::{combine_text_files, COMBINED_FILENAME};
