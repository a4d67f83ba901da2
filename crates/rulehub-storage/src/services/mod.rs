mod object_store;
mod s3_store;

pub use object_store::{
    DownloadUrlMode, ObjectStatus, ObjectStore, UploadTarget, STATUS_PERMANENT, STATUS_TAG,
    STATUS_TEMPORARY,
};
pub use s3_store::S3ObjectStore;
