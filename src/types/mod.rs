pub mod error;

pub use error::{
    Classified, ErrorClassifier, FailureClass, RemoteError, Result, SerpError,
};
