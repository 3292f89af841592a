pub mod detected_face;
pub mod identify_candidate;
pub mod person_profile;
pub mod recognition_client;
