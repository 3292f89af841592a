/// A scored association between a detected face and a known identity.
///
/// Confidence is in `[0, 1]`. The remote service documents descending
/// confidence order but the contract is not guaranteed, so selection
/// never trusts position.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifyCandidate {
    pub face_id: String,
    pub person_id: String,
    pub confidence: f64,
}

impl IdentifyCandidate {
    /// Picks the highest-confidence candidate. Ties keep the earliest
    /// entry so repeated calls on the same input agree.
    pub fn best(candidates: &[IdentifyCandidate]) -> Option<&IdentifyCandidate> {
        candidates.iter().reduce(|best, c| {
            if c.confidence > best.confidence {
                c
            } else {
                best
            }
        })
    }
}
