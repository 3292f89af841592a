use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::recognition::domain::detected_face::{DetectedFace, FaceAttribute, FaceAttributes};
use crate::recognition::domain::identify_candidate::IdentifyCandidate;
use crate::recognition::domain::person_profile::PersonProfile;
use crate::recognition::domain::recognition_client::{RecognitionClient, RecognitionError};
use crate::shared::constants::HTTP_TIMEOUT;
use crate::shared::frame::Frame;

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// `RecognitionClient` over the service's HTTPS JSON API.
///
/// Holds the base endpoint and the subscription credential; the identity
/// group is a per-call parameter. Every request is synchronous and
/// unretried — the caller owns retry policy.
pub struct HttpRecognitionClient {
    http: Client,
    endpoint: String,
    key: String,
}

impl HttpRecognitionClient {
    pub fn new(endpoint: &str, key: &str) -> Result<Self, RecognitionError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    /// Maps a non-success response to a `Service` error, extracting the
    /// service's own message from the error payload when present.
    fn check(&self, response: Response) -> Result<Response, RecognitionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(service_error(status, &body))
    }
}

impl RecognitionClient for HttpRecognitionClient {
    fn detect_faces(
        &self,
        frame: &Frame,
        attributes: &[FaceAttribute],
    ) -> Result<Vec<DetectedFace>, RecognitionError> {
        let mut url = self.url("detect?returnFaceId=true");
        if !attributes.is_empty() {
            url.push_str("&returnFaceAttributes=");
            url.push_str(&attributes_query(attributes));
        }

        let response = self
            .http
            .post(url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.data().to_vec())
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let entries: Vec<DetectEntry> = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(entries.into_iter().map(DetectEntry::into_face).collect())
    }

    fn identify(
        &self,
        group_id: &str,
        face_ids: &[String],
    ) -> Result<Vec<IdentifyCandidate>, RecognitionError> {
        let request = IdentifyRequest {
            person_group_id: group_id,
            face_ids,
        };

        let response = self
            .http
            .post(self.url("identify"))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&request)
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let entries: Vec<IdentifyEntry> = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(flatten_identify(entries))
    }

    fn fetch_profile(
        &self,
        group_id: &str,
        person_id: &str,
    ) -> Result<Option<PersonProfile>, RecognitionError> {
        let response = self
            .http
            .get(self.url(&format!("persongroups/{group_id}/persons/{person_id}")))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let person: PersonEntry = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(Some(person.into_profile()))
    }

    fn list_persons(&self, group_id: &str) -> Result<Vec<PersonProfile>, RecognitionError> {
        let response = self
            .http
            .get(self.url(&format!("persongroups/{group_id}/persons")))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let persons: Vec<PersonEntry> = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(persons.into_iter().map(PersonEntry::into_profile).collect())
    }

    fn create_person(
        &self,
        group_id: &str,
        name: &str,
        user_data: &str,
    ) -> Result<String, RecognitionError> {
        let response = self
            .http
            .post(self.url(&format!("persongroups/{group_id}/persons")))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&CreatePersonRequest { name, user_data })
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let created: CreatePersonResponse = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(created.person_id)
    }

    fn add_person_face(
        &self,
        group_id: &str,
        person_id: &str,
        frame: &Frame,
    ) -> Result<String, RecognitionError> {
        let response = self
            .http
            .post(self.url(&format!(
                "persongroups/{group_id}/persons/{person_id}/persistedFaces"
            )))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.data().to_vec())
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let added: AddFaceResponse = self
            .check(response)?
            .json()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;
        Ok(added.persisted_face_id)
    }

    fn train_group(&self, group_id: &str) -> Result<(), RecognitionError> {
        let response = self
            .http
            .post(self.url(&format!("persongroups/{group_id}/train")))
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        self.check(response)?;
        Ok(())
    }
}

fn attributes_query(attributes: &[FaceAttribute]) -> String {
    attributes
        .iter()
        .map(FaceAttribute::wire_name)
        .collect::<Vec<_>>()
        .join(",")
}

/// Flattens the per-face candidate lists into the port's contract of at
/// most one candidate per submitted face id, taking each face's own
/// highest-confidence candidate.
fn flatten_identify(entries: Vec<IdentifyEntry>) -> Vec<IdentifyCandidate> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let best = entry
                .candidates
                .into_iter()
                .reduce(|best, c| if c.confidence > best.confidence { c } else { best })?;
            Some(IdentifyCandidate {
                face_id: entry.face_id,
                person_id: best.person_id,
                confidence: best.confidence,
            })
        })
        .collect()
}

fn service_error(status: StatusCode, body: &str) -> RecognitionError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown service error")
                .to_string()
        });
    RecognitionError::Service {
        status: status.as_u16(),
        message,
    }
}

// --- Wire DTOs ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectEntry {
    face_id: String,
    face_attributes: Option<AttributesEntry>,
}

impl DetectEntry {
    fn into_face(self) -> DetectedFace {
        DetectedFace {
            face_id: self.face_id,
            attributes: FaceAttributes {
                age: self.face_attributes.and_then(|a| a.age),
            },
        }
    }
}

#[derive(Deserialize)]
struct AttributesEntry {
    age: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyRequest<'a> {
    person_group_id: &'a str,
    face_ids: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IdentifyEntry {
    face_id: String,
    #[serde(default)]
    candidates: Vec<CandidateEntry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateEntry {
    person_id: String,
    confidence: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonEntry {
    person_id: String,
    name: String,
    #[serde(default)]
    user_data: Option<String>,
}

impl PersonEntry {
    fn into_profile(self) -> PersonProfile {
        PersonProfile {
            person_id: self.person_id,
            name: self.name,
            user_data: self.user_data.unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePersonRequest<'a> {
    name: &'a str,
    user_data: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePersonResponse {
    person_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddFaceResponse {
    persisted_face_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}
