//! # Discform-Analysis
//!
//! Throw-phase event detection and form-error classification for disc-golf
//! throws recorded as 2D keypoint sequences.
//!
//! ## Pipeline
//!
//! Frames flow one way through the analysis:
//!
//! 1. **Features** - per-frame geometry behind a confidence gate
//! 2. **Events** - best frame for each throw phase, kept in temporal order
//! 3. **Form errors** - rounding, nose-up, all-arm, early release, no brace
//! 4. **Metrics** - posture, balance, hip rotation, arm extension, follow-through
//! 5. **Scorer** - overall score, prioritized issues and feedback band
//!
//! [`AnalysisSession`] owns the state for one recording; [`ThrowAnalyzer`]
//! keeps many sessions behind async locks.

pub mod analyzer;
pub mod events;
pub mod features;
pub mod form_errors;
pub mod metrics;
pub mod scorer;
pub mod session;

pub use analyzer::*;
pub use events::*;
pub use features::*;
pub use form_errors::*;
pub use metrics::*;
pub use scorer::*;
pub use session::*;
