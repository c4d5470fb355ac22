pub mod assign;
pub mod detect;
pub mod expiry;
pub mod normalize;
pub mod ocr;
pub mod scanner;
pub mod vision;

pub use assign::{DATE_BEARING_KEYWORD, UNKNOWN_ITEM, assign_dates};
pub use detect::{DetectorConfig, HttpDetector, NoopDetector};
pub use expiry::{ExpiryResolver, KeywordScope, ResolutionPhase, ResolvedExpiry};
pub use normalize::{ParseFailure, normalize, normalize_fuzzy};
pub use ocr::{TesseractConfig, TesseractRecognizer};
pub use scanner::{DateCandidate, DateGrammar};
pub use vision::{VisionLabeler, VisionProvider};
