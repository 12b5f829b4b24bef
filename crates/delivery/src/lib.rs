//! Delivery timing: when follow-up messages fall due for accepted connections.

pub mod follow_up;

pub use follow_up::{
    is_follow_up_due, select_due, whole_days_between, FollowUpCandidate, FollowUpPolicy,
    FollowUpStage,
};
