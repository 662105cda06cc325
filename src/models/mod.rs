pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyJob, CompanyWithJobs};
pub use job::Job;
pub use user::{User, UserWithJobs};
