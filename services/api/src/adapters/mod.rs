pub mod db;
pub mod github;

pub use db::DbAdapter;
pub use github::GithubAdapter;
