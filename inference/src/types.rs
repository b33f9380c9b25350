use serde::{Deserialize, Serialize};

/// JSON request body shared by all three inference operations.
///
/// `sample_rate` is request-scoped: every segment in one call was cut
/// from audio at the same rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub segments: Vec<Vec<f32>>,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

fn default_sample_rate() -> u32 {
    22050
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_defaults_when_omitted() {
        let req: InferenceRequest = serde_json::from_str(r#"{"segments": [[0.1, 0.2]]}"#).unwrap();
        assert_eq!(req.sample_rate, 22050);
        assert_eq!(req.segments, vec![vec![0.1, 0.2]]);
    }

    #[test]
    fn roundtrips_through_json() {
        let req = InferenceRequest {
            segments: vec![vec![0.0, 0.5], vec![]],
            sample_rate: 44100,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: InferenceRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sample_rate, 44100);
        assert_eq!(back.segments.len(), 2);
    }
}
