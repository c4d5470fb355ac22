pub mod error;
pub mod traits;
pub mod types;

pub use error::ScanError;
pub use traits::{ObjectDetector, TextRecognizer};
pub use types::{
    ErrorResponse, ImageInput, ItemRecord, LabelSet, ScanRequest, ScanResponse, IMAGE_FIELD,
};
