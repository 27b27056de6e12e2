mod issue;
mod member;
mod note;

pub use issue::{Issue, MilestoneRef};
pub use member::Member;
pub use note::{Note, NoteAuthor, NotePage};
