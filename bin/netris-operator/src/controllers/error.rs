use netris_client::ClientError;
use netris_storage::StorageError;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    #[error("Netris API error: {0}")]
    Netris(#[from] ClientError),

    #[error("Netris storage error: {0}")]
    Storage(#[from] StorageError),

    /// The spec could not be resolved against the Netris inventory
    #[error("{0}")]
    Translate(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Finalizer error: {0}")]
    Finalizer(#[source] Box<kube_runtime::finalizer::Error<Error>>),

    #[error("Object is missing {0}")]
    MissingObjectKey(&'static str),
}

impl Error {
    pub fn translate(message: impl Into<String>) -> Self {
        Error::Translate(message.into())
    }

    /// Short label for the reconcile error counter
    pub fn metric_label(&self) -> &'static str {
        match self {
            Error::Kube(_) => "kube",
            Error::Netris(_) => "netris",
            Error::Storage(_) => "storage",
            Error::Translate(_) => "translate",
            Error::Serialization(_) => "serialization",
            Error::Finalizer(_) => "finalizer",
            Error::MissingObjectKey(_) => "missing_object_key",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_labels() {
        assert_eq!(Error::translate("site 'x' not found").metric_label(), "translate");
        assert_eq!(Error::MissingObjectKey("namespace").metric_label(), "missing_object_key");
        let netris = Error::from(ClientError::Api {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(netris.metric_label(), "netris");
        assert_eq!(netris.to_string(), "Netris API error: Netris API error (500): boom");
    }
}
