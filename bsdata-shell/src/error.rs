use std::fmt;

#[derive(Debug)]
pub struct Error(pub String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

impl From<bsdata::Error> for Error {
    fn from(err: bsdata::Error) -> Error {
        Error(format!("provider error: {}", err))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Error {
        Error(format!("sqlite error: {}", err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error(format!("csv error: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error(format!("io error: {}", err))
    }
}
