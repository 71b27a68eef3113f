pub mod echo_listen;
pub mod line_follow;
pub mod orchestrate;
pub mod ranging;
