//! Integration tests driving the note-sync binary

mod test_cli;
mod test_doctor;
mod test_git;
mod test_push_pull;
