use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Which stage of a command failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    #[display("storage backend unavailable")]
    Storage,
    #[display("could not get trending repositories")]
    Cache,
    #[display("could not extract trending repositories")]
    Extract,
    #[display("could not render feed")]
    Render,
    #[display("could not write output")]
    Output,
    #[display("could not read input")]
    Input,
}
