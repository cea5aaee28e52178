use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Key under which a record is persisted.
pub fn record_key(id: Uuid) -> String {
    format!("resume:{id}")
}

/// Structured feedback produced by the inference service. The shape is owned
/// by the prompt, so it is kept as an opaque JSON object.
pub type Feedback = Map<String, Value>;

/// One resume-analysis request and, once available, its feedback.
///
/// Written twice: first with empty feedback, then with the parsed feedback.
/// Empty feedback is stored as `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub resume_path: String,
    pub image_path: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    #[serde(
        serialize_with = "serialize_feedback",
        deserialize_with = "deserialize_feedback",
        default
    )]
    pub feedback: Option<Feedback>,
}

impl SubmissionRecord {
    pub fn key(&self) -> String {
        record_key(self.id)
    }

    pub fn has_feedback(&self) -> bool {
        self.feedback.as_ref().is_some_and(|f| !f.is_empty())
    }
}

fn serialize_feedback<S>(feedback: &Option<Feedback>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match feedback {
        Some(map) => map.serialize(serializer),
        None => serializer.serialize_str(""),
    }
}

fn deserialize_feedback<'de, D>(deserializer: D) -> Result<Option<Feedback>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        other => Err(serde::de::Error::custom(format!(
            "feedback must be an object or empty, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            id: Uuid::nil(),
            resume_path: "uploads/a/cv.pdf".into(),
            image_path: "uploads/b/cv.png".into(),
            company_name: "Acme".into(),
            job_title: "Engineer".into(),
            job_description: "Build things".into(),
            feedback: None,
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            record().key(),
            "resume:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_empty_feedback_serializes_as_empty_string() {
        let value = serde_json::to_value(record()).unwrap();
        assert_eq!(value["feedback"], json!(""));
        assert_eq!(value["resumePath"], json!("uploads/a/cv.pdf"));
        assert_eq!(value["companyName"], json!("Acme"));
    }

    #[test]
    fn test_populated_feedback_is_an_object() {
        let mut rec = record();
        let mut map = Feedback::new();
        map.insert("overallScore".into(), json!(72));
        rec.feedback = Some(map);

        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["feedback"]["overallScore"], json!(72));
        assert!(rec.has_feedback());
    }

    #[test]
    fn test_stored_record_reads_back() {
        let stored = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "resumePath": "r", "imagePath": "i",
            "companyName": "c", "jobTitle": "t", "jobDescription": "d",
            "feedback": ""
        }"#;
        let rec: SubmissionRecord = serde_json::from_str(stored).unwrap();
        assert!(rec.feedback.is_none());
        assert!(!rec.has_feedback());
    }

    #[test]
    fn test_non_object_feedback_is_rejected() {
        let stored = r#"{
            "id": "00000000-0000-0000-0000-000000000000",
            "resumePath": "r", "imagePath": "i",
            "companyName": "c", "jobTitle": "t", "jobDescription": "d",
            "feedback": 42
        }"#;
        assert!(serde_json::from_str::<SubmissionRecord>(stored).is_err());
    }
}
