#![forbid(unsafe_code)]

pub mod app_services;
pub mod course_service;
pub mod engines;
pub mod error;
pub mod generation;
pub mod profile_service;
pub mod session;

pub use ditto_core::Clock;

pub use app_services::AppServices;
pub use course_service::CourseService;
pub use engines::{
    CompletionSink, EngineError, InMemoryAudioEngine, InMemorySpeechEngine, NullSink,
    ReferenceAudio, SpeechRecognizer,
};
pub use error::{
    AppServicesError, CourseServiceError, GenerationError, ProfileServiceError, SessionError,
};
pub use generation::{
    GenerationRequest, GenerationStage, GenerationStatus, GenerationTracker, GenerationUpdate,
};
pub use profile_service::ProfileService;
pub use session::{
    Activity, EngineEvent, Epoch, EventDisposition, PageChange, SentenceVerdict, SentenceView,
    SessionCoordinator, SessionSnapshot, ToggleOutcome,
};
