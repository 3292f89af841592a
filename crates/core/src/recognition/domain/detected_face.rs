/// Attributes the detect stage can be asked to compute per face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceAttribute {
    Age,
}

impl FaceAttribute {
    pub const ALL: &[FaceAttribute] = &[FaceAttribute::Age];

    /// Wire name of the attribute in the detect request.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FaceAttribute::Age => "age",
        }
    }
}

/// Attribute bag computed by the detect stage. Fields are `None` when the
/// attribute was not requested or the service omitted it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceAttributes {
    pub age: Option<f64>,
}

/// A face located within one frame: an opaque service-issued identifier
/// plus the requested attributes. The id is only valid for a short window
/// on the service side, long enough to feed the identify stage.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub face_id: String,
    pub attributes: FaceAttributes,
}

impl DetectedFace {
    /// Collects the ids of all detected faces for the identify stage.
    pub fn ids(faces: &[DetectedFace]) -> Vec<String> {
        faces.iter().map(|f| f.face_id.clone()).collect()
    }
}
