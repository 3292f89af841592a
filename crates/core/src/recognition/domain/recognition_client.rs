use thiserror::Error;

use crate::recognition::domain::detected_face::{DetectedFace, FaceAttribute};
use crate::recognition::domain::identify_candidate::IdentifyCandidate;
use crate::recognition::domain::person_profile::PersonProfile;
use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// The service answered with a fault (auth, quota, bad request).
    /// `status` is the HTTP status code, `message` the service's own text.
    #[error("recognition service error {status}: {message}")]
    Service { status: u16, message: String },
    /// The service could not be reached or answered garbage.
    #[error("recognition transport error: {0}")]
    Transport(String),
}

impl RecognitionError {
    /// Status code to surface to the host, when the fault carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RecognitionError::Service { status, .. } => Some(*status),
            RecognitionError::Transport(_) => None,
        }
    }
}

/// Domain interface for the remote recognition pipeline.
///
/// The three stage calls (`detect_faces`, `identify`, `fetch_profile`)
/// compose into one identification pass. A legitimately empty result is
/// success with zero elements, never an error. The client performs no
/// retries of its own; retry policy belongs entirely to the caller.
pub trait RecognitionClient: Send {
    /// Locates faces in a frame, computing the requested attributes.
    /// An empty result means "no face present".
    fn detect_faces(
        &self,
        frame: &Frame,
        attributes: &[FaceAttribute],
    ) -> Result<Vec<DetectedFace>, RecognitionError>;

    /// Matches detected faces against the identity group. At most one
    /// candidate per submitted face id; ids without a confident match
    /// are simply absent.
    fn identify(
        &self,
        group_id: &str,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyCandidate>, RecognitionError>;

    /// Fetches the identity record for a person id, `None` if the person
    /// is not in the group.
    fn fetch_profile(
        &self,
        group_id: &str,
        person_id: &str,
    ) -> Result<Option<PersonProfile>, RecognitionError>;

    /// Lists every person enrolled in the group.
    fn list_persons(&self, group_id: &str) -> Result<Vec<PersonProfile>, RecognitionError>;

    /// Creates a person record, returning its new person id.
    fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: &str,
    ) -> Result<String, RecognitionError>;

    /// Registers a face image with a person, returning the persisted
    /// face id.
    fn add_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        frame: &Frame,
    ) -> Result<String, RecognitionError>;

    /// Kicks off (re)training of the group's identification model.
    fn train_group(&self, group_id: &str) -> Result<(), RecognitionError>;
}
