pub mod job;
pub mod keyword;
pub mod post;
pub mod run;
pub mod serve;
