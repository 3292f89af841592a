use crate::capture::domain::frame_source::FrameSource;
use crate::recognition::domain::person_profile::PersonProfile;
use crate::recognition::domain::recognition_client::RecognitionClient;

/// Result of one enrollment attempt.
///
/// A frame without a visible face is an outcome the host reports to the
/// user, not a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    Enrolled {
        person_id: String,
        persisted_face_id: String,
        /// True when the person record was created by this enrollment
        /// (as opposed to adding a face to an existing person).
        newly_created: bool,
    },
    NoFaceDetected,
}

/// One-shot enrollment: snap a frame, verify a face is present, then
/// register the face with the named person — creating the person and
/// retraining the group when the name is new.
///
/// Single-use like the identification loop: `execute` consumes the owned
/// components.
pub struct EnrollPersonUseCase {
    source: Option<Box<dyn FrameSource>>,
    client: Option<Box<dyn RecognitionClient>>,
    group_id: String,
}

impl EnrollPersonUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        client: Box<dyn RecognitionClient>,
        group_id: &str,
    ) -> Self {
        Self {
            source: Some(source),
            client: Some(client),
            group_id: group_id.to_string(),
        }
    }

    pub fn execute(
        &mut self,
        name: &str,
    ) -> Result<EnrollmentOutcome, Box<dyn std::error::Error>> {
        let mut source = self.source.take().ok_or("Enrollment already executed")?;
        let client = self.client.take().ok_or("Enrollment already executed")?;

        let name = name.trim();
        if name.is_empty() {
            return Err("Person name must not be empty".into());
        }

        let frame = source.acquire_frame()?;

        // Presence check only; no attributes needed for enrollment.
        let faces = client.detect_faces(&frame, &[])?;
        if faces.is_empty() {
            source.close();
            return Ok(EnrollmentOutcome::NoFaceDetected);
        }

        let persons = client.list_persons(&self.group_id)?;
        let outcome = match PersonProfile::find_by_name(&persons, name) {
            Some(person) => {
                let persisted_face_id =
                    client.add_person_face(&self.group_id, &person.person_id, &frame)?;
                log::info!("added face to existing person {name}");
                EnrollmentOutcome::Enrolled {
                    person_id: person.person_id.clone(),
                    persisted_face_id,
                    newly_created: false,
                }
            }
            None => {
                let person_id = client.create_person(&self.group_id, name, "")?;
                let persisted_face_id =
                    client.add_person_face(&self.group_id, &person_id, &frame)?;
                client.train_group(&self.group_id)?;
                log::info!("enrolled new person {name}");
                EnrollmentOutcome::Enrolled {
                    person_id,
                    persisted_face_id,
                    newly_created: true,
                }
            }
        };

        source.close();
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::domain::frame_source::CaptureError;
    use crate::recognition::domain::detected_face::{DetectedFace, FaceAttribute, FaceAttributes};
    use crate::recognition::domain::identify_candidate::IdentifyCandidate;
    use crate::recognition::domain::recognition_client::RecognitionError;
    use crate::shared::frame::Frame;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct OneShotSource {
        closed: Arc<Mutex<bool>>,
    }

    impl OneShotSource {
        fn new() -> Self {
            Self {
                closed: Arc::new(Mutex::new(false)),
            }
        }
    }

    impl FrameSource for OneShotSource {
        fn is_streaming(&self) -> bool {
            true
        }

        fn acquire_frame(&mut self) -> Result<Frame, CaptureError> {
            Ok(Frame::new(vec![0xAB], 0))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    #[derive(Default)]
    struct EnrollClientState {
        created: Vec<String>,
        faces_added: Vec<String>,
        trained: usize,
    }

    struct StubEnrollClient {
        face_present: bool,
        existing: Vec<PersonProfile>,
        state: Arc<Mutex<EnrollClientState>>,
    }

    impl StubEnrollClient {
        fn new(face_present: bool, existing: Vec<PersonProfile>) -> Self {
            Self {
                face_present,
                existing,
                state: Arc::new(Mutex::new(EnrollClientState::default())),
            }
        }
    }

    impl RecognitionClient for StubEnrollClient {
        fn detect_faces(
            &self,
            _frame: &Frame,
            attributes: &[FaceAttribute],
        ) -> Result<Vec<DetectedFace>, RecognitionError> {
            assert!(attributes.is_empty(), "enrollment requests no attributes");
            if self.face_present {
                Ok(vec![DetectedFace {
                    face_id: "f1".to_string(),
                    attributes: FaceAttributes::default(),
                }])
            } else {
                Ok(Vec::new())
            }
        }

        fn identify(
            &self,
            _group_id: &str,
            _face_ids: &[String],
        ) -> Result<Vec<IdentifyCandidate>, RecognitionError> {
            unreachable!("enrollment never identifies")
        }

        fn fetch_profile(
            &self,
            _group_id: &str,
            _person_id: &str,
        ) -> Result<Option<PersonProfile>, RecognitionError> {
            unreachable!("enrollment never fetches profiles")
        }

        fn list_persons(&self, group_id: &str) -> Result<Vec<PersonProfile>, RecognitionError> {
            assert_eq!(group_id, "group1");
            Ok(self.existing.clone())
        }

        fn create_person(
            &self,
            _group_id: &str,
            name: &str,
            _user_data: &str,
        ) -> Result<String, RecognitionError> {
            self.state.lock().unwrap().created.push(name.to_string());
            Ok("p-new".to_string())
        }

        fn add_person_face(
            &self,
            _group_id: &str,
            person_id: &str,
            _frame: &Frame,
        ) -> Result<String, RecognitionError> {
            self.state
                .lock()
                .unwrap()
                .faces_added
                .push(person_id.to_string());
            Ok("pf-1".to_string())
        }

        fn train_group(&self, _group_id: &str) -> Result<(), RecognitionError> {
            self.state.lock().unwrap().trained += 1;
            Ok(())
        }
    }

    fn existing_person(id: &str, name: &str) -> PersonProfile {
        PersonProfile {
            person_id: id.to_string(),
            name: name.to_string(),
            user_data: String::new(),
        }
    }

    // --- Tests ---

    #[test]
    fn test_new_person_created_face_added_group_trained() {
        let client = StubEnrollClient::new(true, Vec::new());
        let state = client.state.clone();
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        let outcome = uc.execute("Alice").unwrap();

        assert_eq!(
            outcome,
            EnrollmentOutcome::Enrolled {
                person_id: "p-new".to_string(),
                persisted_face_id: "pf-1".to_string(),
                newly_created: true,
            }
        );
        let state = state.lock().unwrap();
        assert_eq!(state.created.as_slice(), ["Alice"]);
        assert_eq!(state.faces_added.as_slice(), ["p-new"]);
        assert_eq!(state.trained, 1);
    }

    #[test]
    fn test_existing_person_only_gains_a_face() {
        let client =
            StubEnrollClient::new(true, vec![existing_person("p-old", "Alice")]);
        let state = client.state.clone();
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        let outcome = uc.execute("Alice").unwrap();

        assert_eq!(
            outcome,
            EnrollmentOutcome::Enrolled {
                person_id: "p-old".to_string(),
                persisted_face_id: "pf-1".to_string(),
                newly_created: false,
            }
        );
        let state = state.lock().unwrap();
        assert!(state.created.is_empty());
        assert_eq!(state.faces_added.as_slice(), ["p-old"]);
        assert_eq!(state.trained, 0);
    }

    #[test]
    fn test_no_face_is_an_outcome_not_an_error() {
        let client = StubEnrollClient::new(false, Vec::new());
        let state = client.state.clone();
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        let outcome = uc.execute("Alice").unwrap();

        assert_eq!(outcome, EnrollmentOutcome::NoFaceDetected);
        assert!(state.lock().unwrap().created.is_empty());
        assert!(state.lock().unwrap().faces_added.is_empty());
    }

    #[test]
    fn test_name_is_trimmed_before_lookup() {
        let client =
            StubEnrollClient::new(true, vec![existing_person("p-old", "Alice")]);
        let state = client.state.clone();
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        let outcome = uc.execute("  Alice  ").unwrap();

        assert!(matches!(
            outcome,
            EnrollmentOutcome::Enrolled {
                newly_created: false,
                ..
            }
        ));
        assert!(state.lock().unwrap().created.is_empty());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let client = StubEnrollClient::new(true, Vec::new());
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        let err = uc.execute("   ").unwrap_err();
        assert_eq!(err.to_string(), "Person name must not be empty");
    }

    #[test]
    fn test_source_closed_on_success() {
        let source = OneShotSource::new();
        let closed = source.closed.clone();
        let client = StubEnrollClient::new(true, Vec::new());
        let mut uc = EnrollPersonUseCase::new(Box::new(source), Box::new(client), "group1");

        uc.execute("Alice").unwrap();
        assert!(*closed.lock().unwrap());
    }

    #[test]
    fn test_second_execute_fails() {
        let client = StubEnrollClient::new(true, Vec::new());
        let mut uc =
            EnrollPersonUseCase::new(Box::new(OneShotSource::new()), Box::new(client), "group1");

        uc.execute("Alice").unwrap();
        let err = uc.execute("Alice").unwrap_err();
        assert_eq!(err.to_string(), "Enrollment already executed");
    }
}
