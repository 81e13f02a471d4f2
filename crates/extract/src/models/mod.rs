mod repository;

pub use self::repository::RepositoryRecord;
