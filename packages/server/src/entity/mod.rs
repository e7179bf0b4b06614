pub mod contest;
pub mod contest_participant;
pub mod task_submission;
pub mod user;
