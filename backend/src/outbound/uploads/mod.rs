//! Upload staging adapters.

mod cap_std_upload_stager;

pub use cap_std_upload_stager::CapStdUploadStager;
