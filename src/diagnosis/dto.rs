use serde::{Deserialize, Serialize};

/// Reduced diagnosis shape returned to clients: the health flags, the
/// candidate diseases with probabilities, classification suggestions and
/// an optional follow-up question from the upstream service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnosis {
    pub is_healthy: Option<bool>,
    pub is_plant: Option<bool>,
    pub diseases: Vec<DiseaseSuggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<FollowUpQuestion>,
    pub classification: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseaseSuggestion {
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpQuestion {
    pub text: String,
    pub options: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    pub success: bool,
    pub diagnosis: Diagnosis,
}

// --- raw Plant.id v3 response ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct IdentificationResponse {
    pub result: Option<RawResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawResult {
    pub is_plant: Option<Flag>,
    pub is_healthy: Option<Flag>,
    pub disease: Option<RawSection>,
    pub classification: Option<RawSection>,
}

/// The API reports flags either as `{"binary": true, "probability": ...}`
/// or as a bare boolean, depending on the endpoint options.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Flag {
    Detailed { binary: bool },
    Plain(bool),
}

impl Flag {
    fn as_bool(&self) -> bool {
        match self {
            Flag::Detailed { binary } => *binary,
            Flag::Plain(b) => *b,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawSection {
    pub suggestions: Vec<RawSuggestion>,
    pub question: Option<RawQuestion>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSuggestion {
    pub name: String,
    #[serde(default)]
    pub probability: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawQuestion {
    pub text: String,
    #[serde(default)]
    pub options: Vec<serde_json::Value>,
}

impl From<IdentificationResponse> for Diagnosis {
    fn from(raw: IdentificationResponse) -> Self {
        let result = raw.result.unwrap_or_default();

        let (diseases, question) = match result.disease {
            Some(section) => (
                section
                    .suggestions
                    .into_iter()
                    .map(|s| DiseaseSuggestion {
                        name: s.name,
                        probability: s.probability,
                    })
                    .collect(),
                section.question.map(|q| FollowUpQuestion {
                    text: q.text,
                    options: q.options,
                }),
            ),
            None => (Vec::new(), None),
        };

        let classification = result
            .classification
            .map(|section| {
                section
                    .suggestions
                    .into_iter()
                    .map(|s| Suggestion {
                        name: s.name,
                        probability: s.probability,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Diagnosis {
            is_healthy: result.is_healthy.as_ref().map(Flag::as_bool),
            is_plant: result.is_plant.as_ref().map(Flag::as_bool),
            diseases,
            question,
            classification,
        }
    }
}
